use chrono::NaiveDate;

use solar_epc_manager::models::{Contract, MilestoneStatus, PaymentMilestone};
use solar_epc_manager::payments::{self, MilestonePlan, DEFAULT_TOLERANCE};
use solar_epc_manager::ValidationError;

fn contract(total: f64) -> Contract {
    let mut c = Contract::new(1, "Montajes Eléctricos SAS", "Installation", total).unwrap();
    c.id = 10;
    c
}

fn anticipo_entrega() -> Vec<PaymentMilestone> {
    vec![
        PaymentMilestone { id: 1, ..PaymentMilestone::new(10, "Anticipo", 30.0, 1) },
        PaymentMilestone { id: 2, ..PaymentMilestone::new(10, "Entrega Final", 70.0, 2) },
    ]
}

fn amounts(milestones: &[PaymentMilestone]) -> Vec<f64> {
    milestones.iter().map(|m| m.amount_usd).collect()
}

#[test]
fn editing_percentages_until_the_plan_balances() {
    let mut plan = MilestonePlan::new(contract(10_000.0), anticipo_entrega());
    assert_eq!(amounts(plan.milestones()), vec![3_000.0, 7_000.0]);
    assert!(plan.validate().is_ok());

    plan.set_percentage(0, 40.0).unwrap();
    assert_eq!(plan.validate(), Err(ValidationError::PercentageSum { actual: 110.0 }));

    plan.set_percentage(1, 60.0).unwrap();
    assert_eq!(amounts(plan.milestones()), vec![4_000.0, 6_000.0]);
    assert!(plan.validate().is_ok());
}

#[test]
fn paying_a_milestone_then_trying_to_remove_it() {
    let c = contract(10_000.0);
    let milestones = payments::recompute(c.total_value_usd, &anticipo_entrega());
    let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

    let (c, paid) = payments::mark_paid(&c, &milestones[0], date).unwrap();
    assert_eq!(c.paid_amount_usd, 3_000.0);

    let milestones = vec![paid, milestones[1].clone()];
    assert_eq!(
        payments::remove_milestone(&milestones, 0),
        Err(ValidationError::MilestonePaid("Anticipo".into()))
    );
    assert_eq!(payments::paid_total(&milestones), c.paid_amount_usd);

    let mut plan = MilestonePlan::new(c, milestones);
    assert!(plan.remove(0).is_err());
    plan.remove(1).unwrap();
    assert_eq!(plan.validate(), Err(ValidationError::PercentageSum { actual: 30.0 }));
    assert_eq!(plan.remove(0), Err(ValidationError::MilestonePaid("Anticipo".into())));
}

#[test]
fn adding_a_milestone_keeps_existing_percentages() {
    let mut plan = MilestonePlan::new(contract(8_000.0), anticipo_entrega());
    let idx = plan.add("Retención");

    assert_eq!(plan.milestones()[idx].order_index, 3);
    assert_eq!(plan.milestones()[idx].percentage, 0.0);
    assert_eq!(plan.percentage_sum(), 100.0);

    plan.set_percentage(idx, 10.0).unwrap();
    plan.set_percentage(1, 60.0).unwrap();
    let saved = plan.into_saveable().unwrap();
    assert_eq!(amounts(&saved.milestones), vec![2_400.0, 4_800.0, 800.0]);
}

#[test]
fn last_milestone_always_stays() {
    let single = vec![PaymentMilestone::new(10, "Pago único", 100.0, 1)];
    assert_eq!(payments::remove_milestone(&single, 0), Err(ValidationError::LastMilestone));
}

#[test]
fn paid_amount_is_monotonic_across_payments() {
    let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let mut c = contract(12_500.0);
    let mut milestones = payments::recompute(
        c.total_value_usd,
        &[
            PaymentMilestone::new(10, "Anticipo", 20.0, 1),
            PaymentMilestone::new(10, "Montaje", 50.0, 2),
            PaymentMilestone::new(10, "Puesta en marcha", 30.0, 3),
        ],
    );
    assert!(payments::validate_for_save(&milestones, DEFAULT_TOLERANCE).is_ok());

    for i in 0..milestones.len() {
        let before = c.paid_amount_usd;
        let (next, paid) = payments::mark_paid(&c, &milestones[i], date).unwrap();
        assert_eq!(next.paid_amount_usd, before + milestones[i].amount_usd);
        assert!(next.paid_amount_usd >= before);
        assert_eq!(paid.status, MilestoneStatus::Paid);
        milestones[i] = paid;
        c = next;
    }

    assert_eq!(c.paid_amount_usd, 12_500.0);
    assert_eq!(c.pending_amount_usd(), 0.0);
}
