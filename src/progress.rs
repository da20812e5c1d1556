use crate::error::ValidationError;
use crate::models::ProgressMilestone;

/// Overall completion of a project, the mean of its progress milestones
pub fn project_progress(milestones: &[ProgressMilestone]) -> f64 {
    if milestones.is_empty() {
        return 0.0;
    }
    milestones.iter().map(|m| m.percent_complete).sum::<f64>() / milestones.len() as f64
}

pub fn set_percent_complete(milestone: &mut ProgressMilestone, percent: f64) -> Result<(), ValidationError> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(ValidationError::PercentageOutOfRange(percent));
    }
    milestone.percent_complete = percent;
    Ok(())
}

/// First milestone (by order) that is not complete yet
pub fn current_phase(milestones: &[ProgressMilestone]) -> Option<&ProgressMilestone> {
    milestones
        .iter()
        .filter(|m| m.percent_complete < 100.0)
        .min_by_key(|m| m.order_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(name: &str, order_index: i32, percent_complete: f64) -> ProgressMilestone {
        ProgressMilestone {
            id: order_index,
            project_id: 1,
            name: name.to_string(),
            percent_complete,
            order_index,
            due_date: None,
        }
    }

    #[test]
    fn progress_is_the_mean() {
        let phases = vec![phase("Ingeniería", 1, 100.0), phase("Montaje", 2, 50.0), phase("Conexión", 3, 0.0)];
        assert_eq!(project_progress(&phases), 50.0);
        assert_eq!(project_progress(&[]), 0.0);
        assert_eq!(current_phase(&phases).unwrap().name, "Montaje");
    }

    #[test]
    fn percent_complete_is_bounded() {
        let mut p = phase("Montaje", 1, 0.0);
        assert!(set_percent_complete(&mut p, 101.0).is_err());
        assert!(set_percent_complete(&mut p, -1.0).is_err());
        set_percent_complete(&mut p, 75.0).unwrap();
        assert_eq!(p.percent_complete, 75.0);
    }
}
