//! Project management commands for CLI.

use clap::Subcommand;
use focusleaf_core::{Priority, ProjectInput, ProjectPatch};

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a new project
    Create {
        /// Project name
        name: String,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Estimated minutes per task
        #[arg(long, default_value_t = 25)]
        minutes: u32,
        /// Number of tasks
        #[arg(long, default_value_t = 1)]
        tasks: u32,
        /// Total estimated minutes (defaults to minutes * tasks)
        #[arg(long)]
        total: Option<u32>,
        /// Planned number of focus sessions
        #[arg(long, default_value_t = 0)]
        sessions: u32,
        /// Display color token
        #[arg(long, default_value = "")]
        color: String,
    },
    /// List projects in creation order
    List {
        /// Only projects that are not completed
        #[arg(long)]
        active: bool,
    },
    /// Show one project
    Show { id: String },
    /// Mark a project completed
    Complete { id: String },
    /// Mark a completed project active again
    Reopen { id: String },
    /// Change project fields
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        minutes: Option<u32>,
        #[arg(long)]
        tasks: Option<u32>,
        #[arg(long)]
        total: Option<u32>,
        #[arg(long)]
        sessions: Option<u32>,
        #[arg(long)]
        color: Option<String>,
    },
}

pub fn run(action: ProjectAction) -> CliResult {
    let app = open_app()?;

    match action {
        ProjectAction::Create {
            name,
            priority,
            minutes,
            tasks,
            total,
            sessions,
            color,
        } => {
            let mut input = ProjectInput::new(name)
                .priority(priority)
                .color(color)
                .tasks(tasks, minutes)
                .sessions(sessions);
            if let Some(total) = total {
                input = input.total_minutes(total);
            }
            let project = app.store.create(input)?;
            eprintln!("Project created: {}", project.id);
            print_json(&project)?;
        }
        ProjectAction::List { active } => {
            let projects = if active {
                app.store.active()
            } else {
                app.store.all()
            };
            print_json(&projects)?;
        }
        ProjectAction::Show { id } => {
            let project = app
                .store
                .get(&id)
                .ok_or_else(|| focusleaf_core::CoreError::not_found(&id))?;
            print_json(&project)?;
        }
        ProjectAction::Complete { id } => {
            print_json(&app.store.set_completion(&id, true)?)?;
        }
        ProjectAction::Reopen { id } => {
            print_json(&app.store.set_completion(&id, false)?)?;
        }
        ProjectAction::Update {
            id,
            name,
            priority,
            minutes,
            tasks,
            total,
            sessions,
            color,
        } => {
            let patch = ProjectPatch {
                name,
                color,
                priority,
                estimated_time_per_task: minutes,
                task_count: tasks,
                total_estimated_time: total,
                estimated_sessions: sessions,
                ..ProjectPatch::default()
            };
            if patch.is_empty() {
                return Err("nothing to update".into());
            }
            print_json(&app.store.update(&id, &patch)?)?;
        }
    }

    app.shutdown();
    Ok(())
}
