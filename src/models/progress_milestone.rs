use chrono::NaiveDate;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct ProgressMilestone {
    pub id: i32,
    pub project_id: i32,
    pub name: String,
    pub percent_complete: f64,
    pub order_index: i32,
    pub due_date: Option<NaiveDate>,
}
