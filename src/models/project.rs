use chrono::{DateTime, NaiveDate, Utc};

use super::text_enum;
use crate::currency::{CurrencyConverter, ProjectCurrency};
use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectStatus {
    Draft,
    Execution,
    Finished,
}

text_enum!(ProjectStatus, "project status", {
    Draft => "draft",
    Execution => "execution",
    Finished => "finished",
});

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub client: String,
    #[sqlx(try_from = "String")]
    pub status: ProjectStatus,
    pub budget_usd: f64,
    pub currency: String,
    pub currency_country: String,
    pub exchange_rate: f64,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// A draft project carrying the currency captured at creation
    pub fn new(
        name: &str,
        client: &str,
        budget_usd: f64,
        currency: ProjectCurrency,
        start_date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        if !budget_usd.is_finite() || budget_usd < 0.0 {
            return Err(ValidationError::InvalidAmount(budget_usd));
        }

        Ok(Self {
            id: 0,
            name: name.to_string(),
            client: client.to_string(),
            status: ProjectStatus::Draft,
            budget_usd,
            currency: currency.currency,
            currency_country: currency.country,
            exchange_rate: currency.exchange_rate,
            location: None,
            start_date,
            end_date: None,
            created_at: Utc::now(),
        })
    }

    /// Converter for every amount that belongs to this project
    pub fn converter(&self) -> Result<CurrencyConverter, ValidationError> {
        CurrencyConverter::new(&self.currency, self.exchange_rate)
    }
}
