use crate::models::{Contract, Project};

/// One contract's line in the payment control report
#[derive(Debug, Clone, PartialEq)]
pub struct CommitmentLine {
    pub contract_id: i32,
    pub subcontractor: String,
    pub service_type: String,
    pub committed_usd: f64,
    pub paid_usd: f64,
    pub pending_usd: f64,
}

/// Budget versus commitments for a single project, in USD
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentControl {
    pub budget_usd: f64,
    pub committed_usd: f64,
    pub paid_usd: f64,
    pub pending_usd: f64,
    /// Negative when contracts exceed the budget
    pub available_usd: f64,
    pub lines: Vec<CommitmentLine>,
}

impl PaymentControl {
    pub fn for_project(project: &Project, contracts: &[Contract]) -> Self {
        let lines: Vec<CommitmentLine> = contracts
            .iter()
            .filter(|c| c.project_id == project.id)
            .map(|c| CommitmentLine {
                contract_id: c.id,
                subcontractor: c.subcontractor.clone(),
                service_type: c.service_type.clone(),
                committed_usd: c.total_value_usd,
                paid_usd: c.paid_amount_usd,
                pending_usd: c.pending_amount_usd(),
            })
            .collect();

        let committed_usd: f64 = lines.iter().map(|l| l.committed_usd).sum();
        let paid_usd: f64 = lines.iter().map(|l| l.paid_usd).sum();

        Self {
            budget_usd: project.budget_usd,
            committed_usd,
            paid_usd,
            pending_usd: (committed_usd - paid_usd).max(0.0),
            available_usd: project.budget_usd - committed_usd,
            lines,
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.available_usd < 0.0
    }

    /// Share of the budget already paid, 0-100
    pub fn execution_percentage(&self) -> f64 {
        if self.budget_usd <= 0.0 {
            return 0.0;
        }
        self.paid_usd / self.budget_usd * 100.0
    }
}
