use thiserror::Error;

/// Domain validation failures.
///
/// These are raised before anything is written to the database; callers
/// abort the operation and show the message to the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("milestone percentages must sum to 100, got {actual}")]
    PercentageSum { actual: f64 },

    #[error("percentage {0} is outside 0-100")]
    PercentageOutOfRange(f64),

    #[error("exchange rate must be a positive number, got {0}")]
    InvalidExchangeRate(f64),

    #[error("amount must be a non-negative number, got {0}")]
    InvalidAmount(f64),

    #[error("a contract must keep at least one milestone")]
    LastMilestone,

    #[error("milestone '{0}' is already paid and cannot be modified")]
    MilestonePaid(String),

    #[error("milestone '{0}' is already paid")]
    AlreadyPaid(String),

    #[error("no milestone at position {0}")]
    MilestoneNotFound(usize),

    #[error("contract has no milestones")]
    NoMilestones,

    #[error("milestone name cannot be empty")]
    EmptyName,

    #[error("cannot change the contract total while milestones are paid")]
    TotalLockedByPayments,

    #[error("payments would exceed the contract total ({paid} > {total})")]
    Overpaid { paid: f64, total: f64 },

    #[error("unknown country '{0}'")]
    UnknownCountry(String),

    #[error("invalid {field} value '{value}'")]
    InvalidVariant { field: &'static str, value: String },

    #[error("could not read '{0}' as an amount")]
    UnparsableAmount(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0} was modified concurrently, reload and try again")]
    ConcurrentModification(String),
}
