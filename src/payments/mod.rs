//! Contract payment schedules.

pub mod control;
pub mod plan;
pub mod reconciler;

pub use control::{CommitmentLine, PaymentControl};
pub use plan::{MilestonePlan, SaveablePlan};
pub use reconciler::{
    add_milestone, mark_paid, paid_total, recompute, remove_milestone, renumber, validate_for_save,
    DEFAULT_TOLERANCE,
};
