use std::collections::BTreeMap;

use crate::currency::CurrencyConverter;
use crate::models::{Contract, Project, ProjectStatus};

/// Portfolio-wide totals, all in USD
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub projects_by_status: BTreeMap<&'static str, usize>,
    pub total_budget_usd: f64,
    pub total_committed_usd: f64,
    pub total_paid_usd: f64,
}

impl DashboardSummary {
    pub fn build(projects: &[Project], contracts: &[Contract]) -> Self {
        let mut projects_by_status: BTreeMap<&'static str, usize> =
            ProjectStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        for p in projects {
            *projects_by_status.entry(p.status.as_str()).or_default() += 1;
        }

        Self {
            projects_by_status,
            total_budget_usd: projects.iter().map(|p| p.budget_usd).sum(),
            total_committed_usd: contracts.iter().map(|c| c.total_value_usd).sum(),
            total_paid_usd: contracts.iter().map(|c| c.paid_amount_usd).sum(),
        }
    }

    pub fn total_pending_usd(&self) -> f64 {
        (self.total_committed_usd - self.total_paid_usd).max(0.0)
    }

    /// Figures as display lines in the session currency
    pub fn render(&self, display: &CurrencyConverter) -> Vec<(String, String)> {
        let mut lines: Vec<(String, String)> = self
            .projects_by_status
            .iter()
            .map(|(status, count)| (format!("Projects ({status})"), count.to_string()))
            .collect();

        lines.push(("Total budget".into(), display.label(self.total_budget_usd)));
        lines.push(("Committed".into(), display.label(self.total_committed_usd)));
        lines.push(("Paid".into(), display.label(self.total_paid_usd)));
        lines.push(("Pending".into(), display.label(self.total_pending_usd())));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::ProjectCurrency;
    use chrono::NaiveDate;

    #[test]
    fn aggregates_and_renders_in_display_currency() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let mut a = Project::new("A", "C1", 1_000.0, ProjectCurrency::from_country("CO").unwrap(), start).unwrap();
        a.status = ProjectStatus::Execution;
        let b = Project::new("B", "C2", 500.0, ProjectCurrency::from_country("MX").unwrap(), start).unwrap();

        let mut c = Contract::new(1, "S", "Civil", 400.0).unwrap();
        c.paid_amount_usd = 100.0;

        let summary = DashboardSummary::build(&[a, b], &[c]);
        assert_eq!(summary.projects_by_status["execution"], 1);
        assert_eq!(summary.projects_by_status["draft"], 1);
        assert_eq!(summary.projects_by_status["finished"], 0);
        assert_eq!(summary.total_pending_usd(), 300.0);

        let cop = CurrencyConverter::new("COP", 4000.0).unwrap();
        let lines = summary.render(&cop);
        assert!(lines.contains(&("Total budget".to_string(), "$6,000,000 COP".to_string())));
        assert!(lines.contains(&("Paid".to_string(), "$400,000 COP".to_string())));
    }
}
