use chrono::NaiveDate;

use super::text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MilestoneStatus {
    Pending,
    Paid,
}

text_enum!(MilestoneStatus, "milestone status", {
    Pending => "pending",
    Paid => "paid",
});

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct PaymentMilestone {
    pub id: i32,
    pub contract_id: i32,
    pub name: String,
    pub percentage: f64,
    pub amount_usd: f64,
    #[sqlx(try_from = "String")]
    pub status: MilestoneStatus,
    pub order_index: i32,
    pub paid_date: Option<NaiveDate>,
}

impl PaymentMilestone {
    /// An unsaved pending milestone
    pub fn new(contract_id: i32, name: &str, percentage: f64, order_index: i32) -> Self {
        Self {
            id: 0,
            contract_id,
            name: name.to_string(),
            percentage,
            amount_usd: 0.0,
            status: MilestoneStatus::Pending,
            order_index,
            paid_date: None,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == MilestoneStatus::Paid
    }
}
