//! These tests need a disposable PostgreSQL database.
//! Run with: DATABASE_URL=postgres://... cargo test -- --ignored

use chrono::NaiveDate;

use solar_epc_manager::config::Config;
use solar_epc_manager::currency::ProjectCurrency;
use solar_epc_manager::db::{self, Database};
use solar_epc_manager::models::{Contract, Project};
use solar_epc_manager::payments::MilestonePlan;
use solar_epc_manager::ValidationError;

async fn connect() -> Database {
    let config = Config::load().expect("config");
    let db = db::init(&config).await.expect("db connect");
    db.migrate().await.expect("migrations");
    db
}

async fn seed_contract(db: &Database) -> i32 {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let project = Project::new(
        "Test plant",
        "Test client",
        50_000.0,
        ProjectCurrency::from_country("Colombia").unwrap(),
        start,
    )
    .unwrap();
    let project_id = db.create_project(&project).await.expect("project");

    let contract = Contract::new(project_id, "Sub", "Civil", 10_000.0).unwrap();
    let mut plan = MilestonePlan::new(contract, Vec::new());
    let a = plan.add("Anticipo");
    plan.set_percentage(a, 30.0).unwrap();
    let b = plan.add("Entrega Final");
    plan.set_percentage(b, 70.0).unwrap();

    db.create_contract(&plan.into_saveable().unwrap()).await.expect("contract")
}

#[tokio::test]
#[ignore]
async fn paying_updates_contract_from_paid_milestones() {
    let db = connect().await;
    let contract_id = seed_contract(&db).await;
    let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

    let milestones = db.get_milestones_by_contract(contract_id).await.unwrap();
    let (contract, paid) = db.mark_milestone_paid(milestones[0].id, date).await.unwrap();
    assert_eq!(contract.paid_amount_usd, 3_000.0);
    assert_eq!(paid.paid_date, Some(date));

    // second attempt is refused and changes nothing
    assert!(db.mark_milestone_paid(milestones[0].id, date).await.is_err());
    assert_eq!(db.get_contract(contract_id).await.unwrap().paid_amount_usd, 3_000.0);

    db.delete_project(contract.project_id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn concurrent_payments_do_not_lose_updates() {
    let db = std::sync::Arc::new(connect().await);
    let contract_id = seed_contract(&db).await;
    let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
    let milestones = db.get_milestones_by_contract(contract_id).await.unwrap();

    let mut tasks = Vec::new();
    for m in milestones {
        let db = db.clone();
        tasks.push(tokio::spawn(async move { db.mark_milestone_paid(m.id, date).await.is_ok() }));
    }
    for t in tasks {
        assert!(t.await.unwrap());
    }

    let contract = db.get_contract(contract_id).await.unwrap();
    assert_eq!(contract.paid_amount_usd, 10_000.0);
    db.delete_project(contract.project_id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn saving_an_edited_plan_renumbers_rows() {
    let db = connect().await;
    let contract_id = seed_contract(&db).await;

    let (contract, milestones) = db.get_contract_with_milestones(contract_id).await.unwrap();
    let mut plan = MilestonePlan::new(contract, milestones);
    plan.remove(0).unwrap();
    let idx = plan.add("Retención");
    plan.set_percentage(idx, 30.0).unwrap();

    let saved = db.save_milestone_plan(&plan.into_saveable().unwrap()).await.unwrap();
    let rows = db.get_milestones_by_contract(contract_id).await.unwrap();
    let order: Vec<_> = rows.iter().map(|m| (m.name.as_str(), m.order_index)).collect();
    assert_eq!(order, vec![("Entrega Final", 1), ("Retención", 2)]);
    assert_eq!(saved.paid_amount_usd, 0.0);

    db.delete_project(saved.project_id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn stale_plan_cannot_overwrite_newer_milestones() {
    let db = connect().await;
    let contract_id = seed_contract(&db).await;
    let (contract, milestones) = db.get_contract_with_milestones(contract_id).await.unwrap();

    // another user saves [30, 60, 10] first
    let mut newer = MilestonePlan::new(contract.clone(), milestones.clone());
    newer.set_percentage(1, 60.0).unwrap();
    let idx = newer.add("Retención");
    newer.set_percentage(idx, 10.0).unwrap();
    db.save_milestone_plan(&newer.into_saveable().unwrap()).await.unwrap();

    // the stale plan [40, 60] still adds up on its own
    let mut stale = MilestonePlan::new(contract, milestones);
    stale.set_percentage(0, 40.0).unwrap();
    stale.set_percentage(1, 60.0).unwrap();
    let err = db.save_milestone_plan(&stale.into_saveable().unwrap()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ValidationError>(),
        Some(ValidationError::ConcurrentModification(_))
    ));

    let rows = db.get_milestones_by_contract(contract_id).await.unwrap();
    let sum: f64 = rows.iter().map(|m| m.percentage).sum();
    assert!((sum - 100.0).abs() < 1e-9);

    let project_id = db.get_contract(contract_id).await.unwrap().project_id;
    db.delete_project(project_id).await.unwrap();
}
