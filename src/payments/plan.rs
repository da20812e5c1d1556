use crate::error::ValidationError;
use crate::models::{Contract, PaymentMilestone};

use super::reconciler::{self, DEFAULT_TOLERANCE};

/// Editable milestone schedule for one contract.
///
/// Amounts are recomputed after every edit, so the plan is always internally
/// consistent apart from the percentage sum, which is only enforced by
/// [`validate`](Self::validate) before saving.
#[derive(Debug, Clone)]
pub struct MilestonePlan {
    contract: Contract,
    milestones: Vec<PaymentMilestone>,
    removed: Vec<i32>,
    tolerance: f64,
}

impl MilestonePlan {
    pub fn new(contract: Contract, milestones: Vec<PaymentMilestone>) -> Self {
        let milestones = reconciler::renumber(&milestones);
        let milestones = reconciler::recompute(contract.total_value_usd, &milestones);

        Self {
            contract,
            milestones,
            removed: Vec::new(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    pub fn milestones(&self) -> &[PaymentMilestone] {
        &self.milestones
    }

    /// Ids of persisted milestones removed from the plan
    pub fn removed_ids(&self) -> &[i32] {
        &self.removed
    }

    pub fn percentage_sum(&self) -> f64 {
        reconciler::percentage_sum(&self.milestones)
    }

    fn has_payments(&self) -> bool {
        self.milestones.iter().any(|m| m.is_paid())
    }

    fn editable(&mut self, index: usize) -> Result<&mut PaymentMilestone, ValidationError> {
        let m = self
            .milestones
            .get_mut(index)
            .ok_or(ValidationError::MilestoneNotFound(index))?;
        if m.is_paid() {
            return Err(ValidationError::MilestonePaid(m.name.clone()));
        }
        Ok(m)
    }

    fn recompute(&mut self) {
        self.milestones = reconciler::recompute(self.contract.total_value_usd, &self.milestones);
    }

    /// Change the contract total. Refused once any milestone is paid.
    pub fn set_total(&mut self, total_value_usd: f64) -> Result<(), ValidationError> {
        if !total_value_usd.is_finite() || total_value_usd < 0.0 {
            return Err(ValidationError::InvalidAmount(total_value_usd));
        }
        if self.has_payments() && total_value_usd != self.contract.total_value_usd {
            return Err(ValidationError::TotalLockedByPayments);
        }

        self.contract.total_value_usd = total_value_usd;
        self.recompute();
        Ok(())
    }

    pub fn set_percentage(&mut self, index: usize, percentage: f64) -> Result<(), ValidationError> {
        if !percentage.is_finite() || !(0.0..=100.0).contains(&percentage) {
            return Err(ValidationError::PercentageOutOfRange(percentage));
        }

        self.editable(index)?.percentage = percentage;
        self.recompute();
        Ok(())
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        self.editable(index)?.name = name.trim().to_string();
        Ok(())
    }

    /// Append a milestone at 0%, returning its position
    pub fn add(&mut self, name: &str) -> usize {
        self.milestones = reconciler::add_milestone(&self.milestones, self.contract.id, name.trim());
        self.milestones.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Result<PaymentMilestone, ValidationError> {
        let target = self
            .milestones
            .get(index)
            .cloned()
            .ok_or(ValidationError::MilestoneNotFound(index))?;

        // keep order indices contiguous so an appended milestone sorts last
        let remaining = reconciler::remove_milestone(&self.milestones, index)?;
        self.milestones = reconciler::renumber(&remaining);
        if target.id != 0 {
            self.removed.push(target.id);
        }
        Ok(target)
    }

    /// Position of the milestone with the given 1-based order index
    pub fn position_of(&self, order_index: i32) -> Option<usize> {
        self.milestones.iter().position(|m| m.order_index == order_index)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        reconciler::validate_for_save(&self.milestones, self.tolerance)
    }

    /// Validate and hand back the contract and the renumbered milestones
    pub fn into_saveable(self) -> Result<SaveablePlan, ValidationError> {
        self.validate()?;

        let milestones = reconciler::renumber(&self.milestones);
        let mut contract = self.contract;
        contract.paid_amount_usd = reconciler::paid_total(&milestones);

        Ok(SaveablePlan {
            contract,
            milestones,
            removed: self.removed,
        })
    }
}

/// A plan that passed validation, ready for one transactional write
#[derive(Debug, Clone)]
pub struct SaveablePlan {
    pub contract: Contract,
    pub milestones: Vec<PaymentMilestone>,
    pub removed: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MilestoneStatus;

    fn plan() -> MilestonePlan {
        let mut contract = Contract::new(1, "Solartec", "Installation", 10_000.0).unwrap();
        contract.id = 3;
        let milestones = vec![
            PaymentMilestone { id: 11, ..PaymentMilestone::new(3, "Anticipo", 30.0, 1) },
            PaymentMilestone { id: 12, ..PaymentMilestone::new(3, "Entrega Final", 70.0, 2) },
        ];
        MilestonePlan::new(contract, milestones)
    }

    fn amounts(plan: &MilestonePlan) -> Vec<f64> {
        plan.milestones().iter().map(|m| m.amount_usd).collect()
    }

    #[test]
    fn edits_recompute_amounts() {
        let mut p = plan();
        assert_eq!(amounts(&p), vec![3_000.0, 7_000.0]);

        p.set_total(20_000.0).unwrap();
        assert_eq!(amounts(&p), vec![6_000.0, 14_000.0]);

        p.set_percentage(0, 50.0).unwrap();
        p.set_percentage(1, 50.0).unwrap();
        assert_eq!(amounts(&p), vec![10_000.0, 10_000.0]);
    }

    #[test]
    fn paid_milestones_are_frozen() {
        let mut p = plan();
        p.milestones[0].status = MilestoneStatus::Paid;

        assert!(matches!(p.set_percentage(0, 10.0), Err(ValidationError::MilestonePaid(_))));
        assert!(matches!(p.rename(0, "Advance"), Err(ValidationError::MilestonePaid(_))));
        assert!(matches!(p.remove(0), Err(ValidationError::MilestonePaid(_))));
        assert_eq!(p.set_total(12_000.0), Err(ValidationError::TotalLockedByPayments));
        assert!(p.set_total(10_000.0).is_ok());
    }

    #[test]
    fn removed_ids_are_tracked_and_renumbered_on_save() {
        let mut p = plan();
        let idx = p.add("Retención");
        p.set_percentage(idx, 10.0).unwrap();
        p.set_percentage(1, 60.0).unwrap();
        p.remove(0).unwrap();
        p.set_percentage(0, 90.0).unwrap();
        assert_eq!(p.removed_ids(), &[11]);

        let saved = p.into_saveable().unwrap();
        let order: Vec<_> = saved.milestones.iter().map(|m| (m.name.as_str(), m.order_index)).collect();
        assert_eq!(order, vec![("Entrega Final", 1), ("Retención", 2)]);
        assert_eq!(saved.removed, vec![11]);
    }

    #[test]
    fn added_milestone_stays_last_after_removals() {
        let mut contract = Contract::new(1, "Solartec", "Installation", 10_000.0).unwrap();
        contract.id = 3;
        let milestones = vec![
            PaymentMilestone { id: 21, ..PaymentMilestone::new(3, "A", 20.0, 1) },
            PaymentMilestone { id: 22, ..PaymentMilestone::new(3, "B", 20.0, 2) },
            PaymentMilestone { id: 23, ..PaymentMilestone::new(3, "C", 60.0, 3) },
        ];
        let mut p = MilestonePlan::new(contract, milestones);

        p.remove(0).unwrap();
        p.remove(0).unwrap();
        assert_eq!(p.position_of(1), Some(0));
        let idx = p.add("D");
        p.set_percentage(idx, 40.0).unwrap();

        let saved = p.into_saveable().unwrap();
        let order: Vec<_> = saved.milestones.iter().map(|m| (m.name.as_str(), m.order_index)).collect();
        assert_eq!(order, vec![("C", 1), ("D", 2)]);
        assert_eq!(saved.removed, vec![21, 22]);
    }

    #[test]
    fn stored_gaps_are_closed_on_load() {
        let contract = Contract::new(1, "Solartec", "Installation", 1_000.0).unwrap();
        let milestones = vec![
            PaymentMilestone::new(0, "Late", 50.0, 7),
            PaymentMilestone::new(0, "Early", 50.0, 4),
        ];
        let p = MilestonePlan::new(contract, milestones);
        let order: Vec<_> = p.milestones().iter().map(|m| (m.name.as_str(), m.order_index)).collect();
        assert_eq!(order, vec![("Early", 1), ("Late", 2)]);
    }

    #[test]
    fn unsaved_milestone_removal_is_not_tracked() {
        let mut p = plan();
        let idx = p.add("Extra");
        p.remove(idx).unwrap();
        assert!(p.removed_ids().is_empty());
    }

    #[test]
    fn save_refuses_bad_sum() {
        let mut p = plan();
        p.set_percentage(0, 40.0).unwrap();
        assert_eq!(
            p.clone().into_saveable().unwrap_err(),
            ValidationError::PercentageSum { actual: 110.0 }
        );
    }

    #[test]
    fn saveable_paid_amount_is_derived() {
        let mut p = plan();
        p.milestones[0].status = MilestoneStatus::Paid;
        p.contract.paid_amount_usd = 999.0;
        let saved = p.into_saveable().unwrap();
        assert_eq!(saved.contract.paid_amount_usd, 3_000.0);
    }
}
