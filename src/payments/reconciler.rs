//! Pure bookkeeping over a contract's payment milestones.
//!
//! Nothing here touches storage. Every function takes the current values and
//! returns the next ones, or a [`ValidationError`] without changing anything.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::models::{Contract, MilestoneStatus, PaymentMilestone};

/// Default distance from 100 accepted when summing percentages
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Amount in USD for `percentage` of `total_usd`
pub fn milestone_amount(total_usd: f64, percentage: f64) -> f64 {
    total_usd * percentage / 100.0
}

/// Recompute every milestone amount from the contract total
pub fn recompute(total_usd: f64, milestones: &[PaymentMilestone]) -> Vec<PaymentMilestone> {
    milestones
        .iter()
        .map(|m| PaymentMilestone {
            amount_usd: milestone_amount(total_usd, m.percentage),
            ..m.clone()
        })
        .collect()
}

pub fn percentage_sum(milestones: &[PaymentMilestone]) -> f64 {
    milestones.iter().map(|m| m.percentage).sum()
}

/// Check a milestone set before it is persisted.
///
/// The percentages have to add up to 100 within `tolerance`; the error
/// carries the actual sum.
pub fn validate_for_save(milestones: &[PaymentMilestone], tolerance: f64) -> Result<(), ValidationError> {
    if milestones.is_empty() {
        return Err(ValidationError::NoMilestones);
    }

    for m in milestones {
        if m.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if !m.percentage.is_finite() || !(0.0..=100.0).contains(&m.percentage) {
            return Err(ValidationError::PercentageOutOfRange(m.percentage));
        }
    }

    let actual = percentage_sum(milestones);
    if (actual - 100.0).abs() > tolerance {
        return Err(ValidationError::PercentageSum { actual });
    }

    Ok(())
}

/// Append a pending milestone at 0% after the existing ones
pub fn add_milestone(milestones: &[PaymentMilestone], contract_id: i32, name: &str) -> Vec<PaymentMilestone> {
    let mut next = milestones.to_vec();
    let order_index = next.len() as i32 + 1;
    next.push(PaymentMilestone::new(contract_id, name, 0.0, order_index));
    next
}

/// Remove the milestone at `index` (0-based position in the list)
pub fn remove_milestone(milestones: &[PaymentMilestone], index: usize) -> Result<Vec<PaymentMilestone>, ValidationError> {
    let target = milestones
        .get(index)
        .ok_or(ValidationError::MilestoneNotFound(index))?;

    if target.is_paid() {
        return Err(ValidationError::MilestonePaid(target.name.clone()));
    }
    if milestones.len() == 1 {
        return Err(ValidationError::LastMilestone);
    }

    let mut next = milestones.to_vec();
    next.remove(index);
    Ok(next)
}

/// Sort by `order_index` and reassign it as 1..N
pub fn renumber(milestones: &[PaymentMilestone]) -> Vec<PaymentMilestone> {
    let mut next = milestones.to_vec();
    next.sort_by_key(|m| m.order_index);
    for (i, m) in next.iter_mut().enumerate() {
        m.order_index = i as i32 + 1;
    }
    next
}

/// Sum of the amounts of paid milestones
pub fn paid_total(milestones: &[PaymentMilestone]) -> f64 {
    milestones
        .iter()
        .filter(|m| m.is_paid())
        .map(|m| m.amount_usd)
        .sum()
}

/// Record payment of `milestone` against `contract`.
///
/// Returns the updated pair. The contract's paid amount grows by exactly the
/// milestone amount; a milestone is paid once and never goes back to pending.
pub fn mark_paid(
    contract: &Contract,
    milestone: &PaymentMilestone,
    paid_date: NaiveDate,
) -> Result<(Contract, PaymentMilestone), ValidationError> {
    if milestone.is_paid() {
        return Err(ValidationError::AlreadyPaid(milestone.name.clone()));
    }

    let paid_amount_usd = contract.paid_amount_usd + milestone.amount_usd;
    if paid_amount_usd > contract.total_value_usd + 1e-6 {
        return Err(ValidationError::Overpaid {
            paid: paid_amount_usd,
            total: contract.total_value_usd,
        });
    }

    let contract = Contract {
        paid_amount_usd,
        ..contract.clone()
    };
    let milestone = PaymentMilestone {
        status: MilestoneStatus::Paid,
        paid_date: Some(paid_date),
        ..milestone.clone()
    };

    Ok((contract, milestone))
}
