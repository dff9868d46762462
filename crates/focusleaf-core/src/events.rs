use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::SessionKind;

/// Every session state change produces an Event.
/// The presentation layer subscribes to them through the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        kind: SessionKind,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    /// At most one per elapsed second of running time.
    TimerTick {
        remaining_ms: u64,
        progress: f64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// The session finished, either by running out or by being skipped.
    TimerCompleted {
        kind: SessionKind,
        skipped: bool,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// The session was quit; nothing is recorded for it.
    SessionAbandoned {
        kind: SessionKind,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// Completion bookkeeping finished for a session.
    SessionRecorded {
        project_id: Option<String>,
        kind: SessionKind,
        minutes: u64,
        completed_today: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn is_completion(&self) -> bool {
        matches!(self, Event::TimerCompleted { .. })
    }
}
