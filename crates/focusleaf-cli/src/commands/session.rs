//! Foreground session runner.
//!
//! Drives the orchestrator from a tokio interval and streams every event to
//! stdout as one JSON object per line. When stderr is a terminal a `MM:SS`
//! countdown is drawn there. The command returns once the session has been
//! recorded.

use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use focusleaf_core::stats::format_clock;
use focusleaf_core::{Config, Event, FocusLeaf, SessionKind};
use tracing::debug;

use super::CliResult;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Run one session in the foreground
    Run {
        /// Project to record the session against
        #[arg(long)]
        project: Option<String>,
        /// work or meditation
        #[arg(long, default_value = "work")]
        kind: SessionKind,
        /// Override the configured length for this run
        #[arg(long)]
        minutes: Option<u32>,
    },
}

pub fn run(action: SessionAction) -> CliResult {
    match action {
        SessionAction::Run {
            project,
            kind,
            minutes,
        } => {
            let mut config = Config::load()?;
            if let Some(minutes) = minutes {
                match kind {
                    SessionKind::Work => config.timer.work_minutes = minutes,
                    SessionKind::Meditation => config.timer.meditation_minutes = minutes,
                }
            }
            let app = FocusLeaf::open_default(&config)?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;
            runtime.block_on(run_session(app, project, kind))
        }
    }
}

async fn run_session(mut app: FocusLeaf, project: Option<String>, kind: SessionKind) -> CliResult {
    let done = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&done);
    let countdown = std::io::stderr().is_terminal();
    let _events = app.sessions.subscribe(move |event| {
        if let Ok(line) = serde_json::to_string(event) {
            println!("{line}");
        }
        match event {
            Event::TimerTick { remaining_ms, .. } if countdown => {
                let mut err = std::io::stderr();
                let _ = write!(err, "\r{} ", format_clock(*remaining_ms));
                let _ = err.flush();
            }
            Event::SessionRecorded { .. } => flag.store(true, Ordering::SeqCst),
            _ => {}
        }
    });

    app.sessions.set_kind(kind);
    app.sessions.start(project.as_deref())?;

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    let outcome = loop {
        interval.tick().await;
        if let Err(e) = app.sessions.tick() {
            break Err(e);
        }
        if done.load(Ordering::SeqCst) {
            break Ok(());
        }
    };

    debug!("session runner finished");
    app.shutdown();
    Ok(outcome?)
}
