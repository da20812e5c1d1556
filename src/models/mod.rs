/// Text-backed enum columns.
///
/// Generates `as_str`, `Display`, `FromStr` and `TryFrom<String>` so rows can
/// be decoded with `#[sqlx(try_from = "String")]` and the CLI can parse the
/// same spelling.
macro_rules! text_enum {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::error::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(crate::error::ValidationError::InvalidVariant {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = crate::error::ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

pub(crate) use text_enum;

mod audit_log;
mod contract;
mod crew;
mod document;
mod equipment;
mod inventory_item;
mod notification;
mod payment_milestone;
mod progress_milestone;
mod project;
mod supplier;
mod user;

pub use audit_log::AuditLogEntry;
pub use contract::Contract;
pub use crew::Crew;
pub use document::{Document, DocumentCategory};
pub use equipment::{Equipment, EquipmentStatus};
pub use inventory_item::InventoryItem;
pub use notification::Notification;
pub use payment_milestone::{MilestoneStatus, PaymentMilestone};
pub use progress_milestone::ProgressMilestone;
pub use project::{Project, ProjectStatus};
pub use supplier::Supplier;
pub use user::{Role, UserProfile};
