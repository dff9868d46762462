//! Session lifecycle on top of the timer and the project store.
//!
//! The orchestrator owns the only [`SessionTimer`]. Completion (expiry or
//! skip) records the session against its project through the store, bumps
//! the daily counter and returns the timer to Idle. Quitting only resets.

use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::observe::{Broadcaster, Subscription};
use crate::project::ProjectStore;
use crate::storage::TimerConfig;
use crate::timer::{Clock, SessionKind, SessionTimer, TimerSnapshot};

/// Daily progress dots: `filled` of `slots`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIndicator {
    pub filled: u32,
    pub slots: u32,
}

#[derive(Debug, Clone)]
struct ActiveSession {
    project_id: Option<String>,
    kind: SessionKind,
    minutes: u64,
}

pub struct SessionOrchestrator {
    store: Arc<ProjectStore>,
    timer: SessionTimer,
    config: TimerConfig,
    next_kind: SessionKind,
    active: Option<ActiveSession>,
    completed_today: u32,
    today: NaiveDate,
    date_source: DateSource,
    events: Broadcaster<Event>,
}

type DateSource = Box<dyn Fn() -> NaiveDate + Send>;

impl SessionOrchestrator {
    pub fn new(store: Arc<ProjectStore>, config: TimerConfig, clock: Arc<dyn Clock>) -> Self {
        let mut timer = SessionTimer::new(clock);
        let next_kind = SessionKind::Work;
        timer.configure(config.durations().duration_ms(next_kind), next_kind);
        Self {
            store,
            timer,
            config,
            next_kind,
            active: None,
            completed_today: 0,
            today: local_today(),
            date_source: Box::new(local_today),
            events: Broadcaster::new(),
        }
    }

    /// Replace the source of the current local date used for the daily
    /// counter.
    pub fn with_date_source<F>(mut self, today: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + 'static,
    {
        self.today = today();
        self.date_source = Box::new(today);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Kind used by the next `start`.
    pub fn kind(&self) -> SessionKind {
        self.next_kind
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.timer.snapshot()
    }

    pub fn active_project(&self) -> Option<&str> {
        self.active.as_ref().and_then(|s| s.project_id.as_deref())
    }

    /// Sessions completed since local midnight in this process.
    pub fn completed_today(&self) -> u32 {
        if self.today == (self.date_source)() {
            self.completed_today
        } else {
            0
        }
    }

    pub fn indicator(&self) -> SessionIndicator {
        let slots = self.config.sessions_before_long_break;
        SessionIndicator {
            filled: self.completed_today().min(slots),
            slots,
        }
    }

    /// Observe every timer and session event, in order.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: FnMut(&Event) + Send + 'static,
    {
        self.events.subscribe(observer)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Choose the kind of the next session. A running session keeps its
    /// own kind and duration.
    pub fn set_kind(&mut self, kind: SessionKind) {
        self.next_kind = kind;
        self.timer
            .configure(self.config.durations().duration_ms(kind), kind);
    }

    /// Start a session of the current kind, optionally for a project.
    /// A session already in progress is cancelled first without being
    /// recorded.
    pub fn start(&mut self, project_id: Option<&str>) -> Result<()> {
        self.start_kind(project_id, self.next_kind)
    }

    pub fn pause(&mut self) {
        let event = self.timer.pause();
        self.emit(event);
    }

    pub fn resume(&mut self) {
        let event = self.timer.resume();
        self.emit(event);
    }

    /// Finish the current session now and record it.
    pub fn skip(&mut self) -> Result<()> {
        match self.timer.skip() {
            Some(event) => {
                self.emit(Some(event));
                self.complete()
            }
            None => Ok(()),
        }
    }

    /// Abandon the current session. Nothing is recorded.
    pub fn quit(&mut self) {
        let event = self.timer.quit();
        if let Some(session) = self.active.take() {
            info!(kind = %session.kind, "session abandoned");
        }
        self.emit(event);
        self.timer.configure(
            self.config.durations().duration_ms(self.next_kind),
            self.next_kind,
        );
    }

    /// Drive the countdown. Call periodically while a session runs.
    pub fn tick(&mut self) -> Result<()> {
        let events = self.timer.tick();
        let completed = events.iter().any(Event::is_completion);
        for event in events {
            self.emit(Some(event));
        }
        if completed {
            self.complete()?;
        }
        Ok(())
    }

    /// Cancel anything in progress and drop all observers.
    pub fn shutdown(&mut self) {
        if self.timer.is_active() {
            self.quit();
        }
        self.events = Broadcaster::new();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn start_kind(&mut self, project_id: Option<&str>, kind: SessionKind) -> Result<()> {
        if let Some(id) = project_id {
            if self.store.get(id).is_none() {
                return Err(CoreError::not_found(id));
            }
        }

        if self.timer.is_active() {
            debug!("cancelling running session before starting a new one");
            self.active = None;
            let reset = self.timer.reset();
            self.emit(reset);
        }

        let minutes = self.config.durations().minutes(kind);
        let started = self
            .timer
            .start(self.config.durations().duration_ms(kind), kind);
        if started.is_some() {
            self.active = Some(ActiveSession {
                project_id: project_id.map(str::to_string),
                kind,
                minutes,
            });
        }
        self.emit(started);
        Ok(())
    }

    fn complete(&mut self) -> Result<()> {
        let session = self.active.take();

        let today = (self.date_source)();
        if today != self.today {
            self.today = today;
            self.completed_today = 0;
        }
        self.completed_today += 1;

        self.timer.reset();
        self.timer.configure(
            self.config.durations().duration_ms(self.next_kind),
            self.next_kind,
        );

        let (project_id, kind, minutes) = match session {
            Some(s) => (s.project_id, s.kind, s.minutes),
            None => (None, self.timer.kind(), 0),
        };

        let recorded = match project_id.as_deref() {
            Some(id) => {
                let minutes = u32::try_from(minutes).unwrap_or(u32::MAX);
                self.store.record_session(id, minutes).map(|_| ())
            }
            None => Ok(()),
        };
        match &recorded {
            Ok(()) => info!(
                project = project_id.as_deref().unwrap_or("-"),
                %kind,
                minutes,
                completed_today = self.completed_today,
                "session recorded"
            ),
            Err(e) => warn!(error = %e, "session finished but could not be recorded"),
        }

        self.emit(Some(Event::SessionRecorded {
            project_id: project_id.clone(),
            kind,
            minutes,
            completed_today: self.completed_today,
            at: Utc::now(),
        }));

        if self.config.auto_start_sessions {
            self.start_kind(project_id.as_deref(), kind)?;
        }
        recorded
    }

    fn emit(&self, event: Option<Event>) {
        if let Some(event) = event {
            self.events.publish(&event);
        }
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}
