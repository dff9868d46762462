use serde::{Deserialize, Serialize};

use crate::project::Project;

/// Totals over active (not completed) projects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_tasks: u64,
    pub total_minutes: u64,
}

/// Sum task counts and estimated minutes over projects that are not
/// completed. A zero total falls back to `estimated_time_per_task *
/// task_count`, since records may predate the total.
pub fn compute_stats(projects: &[Project]) -> OverallStats {
    projects
        .iter()
        .filter(|p| p.is_active())
        .fold(OverallStats::default(), |acc, p| OverallStats {
            total_tasks: acc.total_tasks + u64::from(p.task_count),
            total_minutes: acc.total_minutes + u64::from(p.effective_total_minutes()),
        })
}
