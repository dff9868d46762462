//! Per-project session progress and the overall focus summary.

use serde::{Deserialize, Serialize};

use crate::project::Project;

/// Nominal length of one planned session, in minutes.
pub const MINUTES_PER_SESSION: u64 = 25;

/// Session progress of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectProgress {
    pub id: String,
    pub name: String,
    pub completed: u32,
    pub estimated: u32,
    /// `completed / estimated * 100`; may exceed 100.
    pub progress_pct: f64,
}

/// Totals across every project, completed or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSummary {
    pub project_count: u64,
    pub planned_sessions: u64,
    pub planned_focus_minutes: u64,
    pub completed_sessions: u64,
    pub focus_minutes: u64,
    pub total_planned_minutes: u64,
}

pub fn project_progress(projects: &[Project]) -> Vec<ProjectProgress> {
    projects
        .iter()
        .map(|p| {
            let progress_pct = if p.estimated_sessions > 0 {
                f64::from(p.completed_sessions) / f64::from(p.estimated_sessions) * 100.0
            } else {
                0.0
            };
            ProjectProgress {
                id: p.id.clone(),
                name: p.name.clone(),
                completed: p.completed_sessions,
                estimated: p.estimated_sessions,
                progress_pct,
            }
        })
        .collect()
}

pub fn focus_summary(projects: &[Project]) -> FocusSummary {
    let mut summary = projects.iter().fold(FocusSummary::default(), |mut acc, p| {
        acc.project_count += 1;
        acc.planned_sessions += u64::from(p.estimated_sessions);
        acc.completed_sessions += u64::from(p.completed_sessions);
        acc.focus_minutes += u64::from(p.total_focus_minutes);
        acc.total_planned_minutes += u64::from(p.effective_total_minutes());
        acc
    });
    summary.planned_focus_minutes = summary.planned_sessions * MINUTES_PER_SESSION;
    summary
}

/// Minutes as `HH.MM.SS`.
pub fn format_hms(minutes: u64) -> String {
    format!("{:02}.{:02}.{:02}", minutes / 60, minutes % 60, 0)
}

/// Milliseconds as `MM:SS`, rounding partial seconds up so a running
/// countdown never shows `00:00` early.
pub fn format_clock(ms: u64) -> String {
    let secs = ms.div_ceil(1000);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectInput;
    use chrono::Utc;

    fn project(name: &str, estimated: u32, completed: u32, focus: u32) -> Project {
        let mut p = ProjectInput::new(name)
            .sessions(estimated)
            .into_project(name.to_string(), Utc::now())
            .unwrap();
        p.completed_sessions = completed;
        p.total_focus_minutes = focus;
        p
    }

    #[test]
    fn progress_is_ratio_of_sessions() {
        let rows = project_progress(&[project("a", 4, 1, 25), project("b", 0, 3, 75)]);
        assert_eq!(rows[0].progress_pct, 25.0);
        assert_eq!(rows[1].progress_pct, 0.0);
    }

    #[test]
    fn progress_may_exceed_estimate() {
        let rows = project_progress(&[project("a", 1, 3, 75)]);
        assert_eq!(rows[0].progress_pct, 300.0);
    }

    #[test]
    fn summary_counts_every_project() {
        let mut done = project("b", 1, 1, 25);
        done.is_completed = true;
        let summary = focus_summary(&[project("a", 2, 1, 25), done]);
        assert_eq!(summary.project_count, 2);
        assert_eq!(summary.planned_sessions, 3);
        assert_eq!(summary.planned_focus_minutes, 75);
        assert_eq!(summary.completed_sessions, 2);
        assert_eq!(summary.focus_minutes, 50);
        assert_eq!(summary.total_planned_minutes, 50);
    }

    #[test]
    fn formats() {
        assert_eq!(format_hms(135), "02.15.00");
        assert_eq!(format_clock(1_500_000), "25:00");
        assert_eq!(format_clock(59_001), "01:00");
        assert_eq!(format_clock(0), "00:00");
    }
}
