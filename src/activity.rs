//! Audit trail and notifications written after state changes.
//!
//! Recording is best effort: a failure here is logged and the operation that
//! triggered it still counts as done.

use crate::db::Database;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq)]
pub enum ActivityEvent {
    Created { entity: &'static str, id: i32, name: String },
    Deleted { entity: &'static str, id: i32 },
    MilestonePlanSaved { contract_id: i32, milestones: usize },
    MilestonePaid { contract_id: i32, milestone_id: i32, name: String, amount: String },
    ProgressUpdated { milestone_id: i32, percent: f64 },
}

impl ActivityEvent {
    /// (action, entity, entity id, details)
    pub fn audit_fields(&self) -> (&'static str, &'static str, i32, Option<String>) {
        match self {
            ActivityEvent::Created { entity, id, name } => ("create", *entity, *id, Some(name.clone())),
            ActivityEvent::Deleted { entity, id } => ("delete", *entity, *id, None),
            ActivityEvent::MilestonePlanSaved { contract_id, milestones } => (
                "update_milestones",
                "contract",
                *contract_id,
                Some(format!("{milestones} milestones")),
            ),
            ActivityEvent::MilestonePaid { milestone_id, name, amount, .. } => (
                "mark_paid",
                "payment_milestone",
                *milestone_id,
                Some(format!("{name}: {amount}")),
            ),
            ActivityEvent::ProgressUpdated { milestone_id, percent } => (
                "update_progress",
                "progress_milestone",
                *milestone_id,
                Some(format!("{percent}%")),
            ),
        }
    }

    /// Broadcast notification for events other users should see
    pub fn notification(&self) -> Option<(String, String)> {
        match self {
            ActivityEvent::MilestonePaid { contract_id, name, amount, .. } => Some((
                "Payment recorded".to_string(),
                format!("Milestone '{name}' of contract #{contract_id} paid ({amount})"),
            )),
            _ => None,
        }
    }
}

pub async fn record(db: &Database, session: &Session, event: ActivityEvent) {
    let (action, entity, entity_id, details) = event.audit_fields();

    if let Err(err) = db
        .insert_audit_entry(session.user_id(), action, entity, entity_id, details.as_deref())
        .await
    {
        tracing::warn!(error = %err, action, entity, entity_id, "could not write audit entry");
    }

    if let Some((title, message)) = event.notification() {
        if let Err(err) = db.insert_notification(None, &title, &message).await {
            tracing::warn!(error = %err, %title, "could not send notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_payments_notify() {
        let paid = ActivityEvent::MilestonePaid {
            contract_id: 2,
            milestone_id: 9,
            name: "Anticipo".into(),
            amount: "$3,000.00 USD".into(),
        };
        let (action, entity, id, details) = paid.audit_fields();
        assert_eq!((action, entity, id), ("mark_paid", "payment_milestone", 9));
        assert_eq!(details.as_deref(), Some("Anticipo: $3,000.00 USD"));
        assert!(paid.notification().unwrap().1.contains("contract #2"));

        let deleted = ActivityEvent::Deleted { entity: "crew", id: 3 };
        assert!(deleted.notification().is_none());
    }
}
