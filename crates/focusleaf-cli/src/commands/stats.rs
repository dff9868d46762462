use clap::Subcommand;
use focusleaf_core::stats::{focus_summary, format_hms, project_progress};
use serde_json::json;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Task and minute totals over active projects
    Overall,
    /// Completed versus planned sessions per project
    Progress,
    /// Planned and recorded focus time across all projects
    Summary,
}

pub fn run(action: StatsAction) -> CliResult {
    let app = open_app()?;

    match action {
        StatsAction::Overall => {
            let stats = app.stats.current();
            print_json(&json!({
                "total_tasks": stats.total_tasks,
                "total_minutes": stats.total_minutes,
                "total_time": format_hms(stats.total_minutes),
            }))?;
        }
        StatsAction::Progress => {
            print_json(&project_progress(&app.store.all()))?;
        }
        StatsAction::Summary => {
            let summary = focus_summary(&app.store.all());
            print_json(&json!({
                "summary": summary,
                "focus_time": format_hms(summary.focus_minutes),
                "planned_time": format_hms(summary.planned_focus_minutes),
            }))?;
        }
    }

    app.shutdown();
    Ok(())
}
