use chrono::{DateTime, Utc};

use crate::error::ValidationError;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Contract {
    pub id: i32,
    pub project_id: i32,
    pub subcontractor: String,
    pub service_type: String,
    pub total_value_usd: f64,
    /// Sum of paid milestone amounts, kept in step by the database layer
    pub paid_amount_usd: f64,
    pub created_at: DateTime<Utc>,
}

impl Contract {
    pub fn new(
        project_id: i32,
        subcontractor: &str,
        service_type: &str,
        total_value_usd: f64,
    ) -> Result<Self, ValidationError> {
        if !total_value_usd.is_finite() || total_value_usd < 0.0 {
            return Err(ValidationError::InvalidAmount(total_value_usd));
        }

        Ok(Self {
            id: 0,
            project_id,
            subcontractor: subcontractor.to_string(),
            service_type: service_type.to_string(),
            total_value_usd,
            paid_amount_usd: 0.0,
            created_at: Utc::now(),
        })
    }

    pub fn pending_amount_usd(&self) -> f64 {
        (self.total_value_usd - self.paid_amount_usd).max(0.0)
    }
}
