use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{Postgres, Transaction};

use super::Database;
use crate::error::ValidationError;
use crate::models::{Contract, MilestoneStatus, PaymentMilestone};
use crate::payments::{reconciler, SaveablePlan};

const RECOMPUTE_PAID_AMOUNT: &str = r#"
    UPDATE contracts
    SET paid_amount_usd = (
        SELECT COALESCE(SUM(amount_usd), 0::float8)
        FROM payment_milestones
        WHERE contract_id = $1 AND status = 'paid'
    )
    WHERE id = $1
    RETURNING paid_amount_usd
"#;

async fn lock_contract(tx: &mut Transaction<'_, Postgres>, id: i32) -> Result<Contract> {
    let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .with_context(|| format!("contract {id} not found"))?;

    Ok(contract)
}

async fn insert_milestone(tx: &mut Transaction<'_, Postgres>, contract_id: i32, m: &PaymentMilestone) -> Result<i32> {
    let id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO payment_milestones (contract_id, name, percentage, amount_usd, status, order_index, paid_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(contract_id)
    .bind(&m.name)
    .bind(m.percentage)
    .bind(m.amount_usd)
    .bind(m.status.as_str())
    .bind(m.order_index)
    .bind(m.paid_date)
    .fetch_one(&mut **tx)
    .await?;

    Ok(id)
}

impl Database {
    // Contract operations
    pub async fn get_contracts(&self) -> Result<Vec<Contract>> {
        let contracts = sqlx::query_as::<_, Contract>("SELECT * FROM contracts ORDER BY created_at DESC")
            .fetch_all(self.get_pool())
            .await?;

        Ok(contracts)
    }

    pub async fn get_contracts_by_project(&self, project_id: i32) -> Result<Vec<Contract>> {
        let contracts = sqlx::query_as::<_, Contract>(
            "SELECT * FROM contracts WHERE project_id = $1 ORDER BY created_at DESC",
        )
        .bind(project_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(contracts)
    }

    pub async fn get_contract(&self, id: i32) -> Result<Contract> {
        let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1")
            .bind(id)
            .fetch_one(self.get_pool())
            .await
            .with_context(|| format!("contract {id} not found"))?;

        Ok(contract)
    }

    pub async fn get_milestones_by_contract(&self, contract_id: i32) -> Result<Vec<PaymentMilestone>> {
        let milestones = sqlx::query_as::<_, PaymentMilestone>(
            "SELECT * FROM payment_milestones WHERE contract_id = $1 ORDER BY order_index ASC",
        )
        .bind(contract_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(milestones)
    }

    pub async fn get_contract_with_milestones(&self, id: i32) -> Result<(Contract, Vec<PaymentMilestone>)> {
        let contract = self.get_contract(id).await?;
        let milestones = self.get_milestones_by_contract(id).await?;
        Ok((contract, milestones))
    }

    pub async fn get_milestone(&self, id: i32) -> Result<PaymentMilestone> {
        let milestone = sqlx::query_as::<_, PaymentMilestone>("SELECT * FROM payment_milestones WHERE id = $1")
            .bind(id)
            .fetch_one(self.get_pool())
            .await
            .with_context(|| format!("payment milestone {id} not found"))?;

        Ok(milestone)
    }

    /// Insert a new contract together with its validated milestone plan
    pub async fn create_contract(&self, plan: &SaveablePlan) -> Result<i32> {
        let mut tx = self.pool.begin().await?;

        let contract_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO contracts (project_id, subcontractor, service_type, total_value_usd, paid_amount_usd)
            VALUES ($1, $2, $3, $4, 0)
            RETURNING id
            "#,
        )
        .bind(plan.contract.project_id)
        .bind(&plan.contract.subcontractor)
        .bind(&plan.contract.service_type)
        .bind(plan.contract.total_value_usd)
        .fetch_one(&mut *tx)
        .await?;

        for m in &plan.milestones {
            insert_milestone(&mut tx, contract_id, m).await?;
        }

        tx.commit().await?;

        tracing::info!(contract_id, milestones = plan.milestones.len(), "contract created");
        Ok(contract_id)
    }

    /// Persist an edited milestone plan as one unit.
    ///
    /// Pending rows are only written while they are still pending, so a payment
    /// recorded by someone else in the meantime aborts the whole save. So does
    /// a stored milestone the plan has never seen.
    pub async fn save_milestone_plan(&self, plan: &SaveablePlan) -> Result<Contract> {
        let contract_id = plan.contract.id;
        let mut tx = self.pool.begin().await?;

        let stored = lock_contract(&mut tx, contract_id).await?;
        let stored_milestones = sqlx::query_as::<_, PaymentMilestone>(
            "SELECT * FROM payment_milestones WHERE contract_id = $1",
        )
        .bind(contract_id)
        .fetch_all(&mut *tx)
        .await?;

        if stored.total_value_usd != plan.contract.total_value_usd
            && stored_milestones.iter().any(|m| m.is_paid())
        {
            return Err(ValidationError::TotalLockedByPayments.into());
        }

        // every stored row must be either kept or removed by this plan
        if let Some(unknown) = stored_milestones
            .iter()
            .find(|s| !plan.removed.contains(&s.id) && !plan.milestones.iter().any(|m| m.id == s.id))
        {
            return Err(ValidationError::ConcurrentModification(format!("milestone '{}'", unknown.name)).into());
        }

        for id in &plan.removed {
            let deleted = sqlx::query(
                "DELETE FROM payment_milestones WHERE id = $1 AND contract_id = $2 AND status = 'pending'",
            )
            .bind(id)
            .bind(contract_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if deleted == 0 {
                return Err(ValidationError::ConcurrentModification(format!("milestone {id}")).into());
            }
        }

        for m in &plan.milestones {
            if m.id == 0 {
                insert_milestone(&mut tx, contract_id, m).await?;
                continue;
            }

            let updated = match m.status {
                MilestoneStatus::Paid => sqlx::query(
                    "UPDATE payment_milestones SET order_index = $1 WHERE id = $2 AND contract_id = $3",
                )
                .bind(m.order_index)
                .bind(m.id)
                .bind(contract_id)
                .execute(&mut *tx)
                .await?
                .rows_affected(),
                MilestoneStatus::Pending => sqlx::query(
                    r#"
                    UPDATE payment_milestones
                    SET name = $1, percentage = $2, amount_usd = $3, order_index = $4
                    WHERE id = $5 AND contract_id = $6 AND status = 'pending'
                    "#,
                )
                .bind(&m.name)
                .bind(m.percentage)
                .bind(m.amount_usd)
                .bind(m.order_index)
                .bind(m.id)
                .bind(contract_id)
                .execute(&mut *tx)
                .await?
                .rows_affected(),
            };

            if updated == 0 {
                return Err(ValidationError::ConcurrentModification(format!("milestone '{}'", m.name)).into());
            }
        }

        sqlx::query("UPDATE contracts SET subcontractor = $1, service_type = $2, total_value_usd = $3 WHERE id = $4")
            .bind(&plan.contract.subcontractor)
            .bind(&plan.contract.service_type)
            .bind(plan.contract.total_value_usd)
            .bind(contract_id)
            .execute(&mut *tx)
            .await?;

        let paid_amount_usd = sqlx::query_scalar::<_, f64>(RECOMPUTE_PAID_AMOUNT)
            .bind(contract_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(contract_id, milestones = plan.milestones.len(), removed = plan.removed.len(), "milestone plan saved");
        Ok(Contract {
            paid_amount_usd,
            ..plan.contract.clone()
        })
    }

    /// Record payment of a milestone.
    ///
    /// The status flip is guarded on `pending` and the contract's paid amount
    /// is recomputed from its paid milestones in the same transaction.
    pub async fn mark_milestone_paid(
        &self,
        milestone_id: i32,
        paid_date: NaiveDate,
    ) -> Result<(Contract, PaymentMilestone)> {
        let mut tx = self.pool.begin().await?;

        let milestone = sqlx::query_as::<_, PaymentMilestone>("SELECT * FROM payment_milestones WHERE id = $1")
            .bind(milestone_id)
            .fetch_one(&mut *tx)
            .await
            .with_context(|| format!("payment milestone {milestone_id} not found"))?;
        let contract = lock_contract(&mut tx, milestone.contract_id).await?;

        let (expected, paid) = reconciler::mark_paid(&contract, &milestone, paid_date)?;

        let updated = sqlx::query(
            r#"
            UPDATE payment_milestones
            SET status = 'paid', paid_date = $1
            WHERE id = $2 AND status = 'pending'
            "#,
        )
        .bind(paid_date)
        .bind(milestone_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(ValidationError::AlreadyPaid(milestone.name).into());
        }

        let paid_amount_usd = sqlx::query_scalar::<_, f64>(RECOMPUTE_PAID_AMOUNT)
            .bind(contract.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        if (paid_amount_usd - expected.paid_amount_usd).abs() > 1e-6 {
            tracing::warn!(
                contract_id = contract.id,
                stored = contract.paid_amount_usd,
                derived = paid_amount_usd,
                "stored paid amount had drifted from the paid milestones"
            );
        }
        tracing::info!(contract_id = contract.id, milestone_id, amount = paid.amount_usd, "milestone paid");

        Ok((Contract { paid_amount_usd, ..contract }, paid))
    }

    pub async fn delete_contract(&self, id: i32) -> Result<()> {
        sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }
}
