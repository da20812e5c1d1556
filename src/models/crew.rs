#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Crew {
    pub id: i32,
    pub name: String,
    pub leader: Option<String>,
    pub size: i32,
    pub project_id: Option<i32>,
}
