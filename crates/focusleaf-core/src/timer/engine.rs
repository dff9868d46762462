//! Session timer implementation.
//!
//! The session timer is a countdown state machine driven by a monotonic
//! clock. It does not use internal threads - the caller is responsible for
//! calling `tick()` periodically. Remaining time is always derived from real
//! elapsed time, so late or missed ticks never desynchronize the countdown.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//! Running | Paused -> Finished   (expiry or skip)
//! any -> Idle                    (reset or quit)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = SessionTimer::new(Arc::new(MonotonicClock));
//! timer.start(25 * 60 * 1000, SessionKind::Work);
//! // In a loop:
//! for event in timer.tick() { /* TimerTick, then TimerCompleted once */ }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::kind::{SessionDurations, SessionKind};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Finished,
}

/// Point-in-time view of the timer for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: TimerPhase,
    pub kind: SessionKind,
    pub total_ms: u64,
    pub remaining_ms: u64,
    pub progress: f64,
}

/// Single-session countdown.
pub struct SessionTimer {
    clock: Arc<dyn Clock>,
    phase: TimerPhase,
    kind: SessionKind,
    total_ms: u64,
    /// Remaining time as of `last_instant` (or exact, when not running).
    remaining_ms: u64,
    /// Set only while Running.
    last_instant: Option<Instant>,
    /// Whole seconds of elapsed time already reported through ticks.
    reported_secs: u64,
}

impl SessionTimer {
    /// Create an idle timer configured for a default Work session.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let total_ms = SessionDurations::default().duration_ms(SessionKind::Work);
        Self {
            clock,
            phase: TimerPhase::Idle,
            kind: SessionKind::Work,
            total_ms,
            remaining_ms: total_ms,
            last_instant: None,
            reported_secs: 0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    /// Remaining time including time elapsed since the last tick.
    pub fn remaining_ms(&self) -> u64 {
        match self.last_instant {
            Some(last) => {
                let elapsed = elapsed_ms(last, self.clock.now());
                self.remaining_ms.saturating_sub(elapsed)
            }
            None => self.remaining_ms,
        }
    }

    /// 0.0 .. 1.0 progress through the current session.
    pub fn progress(&self) -> f64 {
        progress_of(self.total_ms, self.remaining_ms())
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, TimerPhase::Running | TimerPhase::Paused)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let remaining_ms = self.remaining_ms();
        TimerSnapshot {
            phase: self.phase,
            kind: self.kind,
            total_ms: self.total_ms,
            remaining_ms,
            progress: progress_of(self.total_ms, remaining_ms),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Set the duration and kind shown while idle. Ignored mid-session.
    pub fn configure(&mut self, duration_ms: u64, kind: SessionKind) {
        if self.is_active() || duration_ms == 0 {
            return;
        }
        self.phase = TimerPhase::Idle;
        self.kind = kind;
        self.total_ms = duration_ms;
        self.remaining_ms = duration_ms;
        self.reported_secs = 0;
    }

    pub fn start(&mut self, duration_ms: u64, kind: SessionKind) -> Option<Event> {
        match self.phase {
            TimerPhase::Idle | TimerPhase::Finished if duration_ms > 0 => {
                self.kind = kind;
                self.total_ms = duration_ms;
                self.remaining_ms = duration_ms;
                self.reported_secs = 0;
                self.phase = TimerPhase::Running;
                self.last_instant = Some(self.clock.now());
                Some(Event::TimerStarted {
                    kind,
                    duration_ms,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Stop counting down. A session whose time already ran out is left
    /// Running so the next `tick()` completes it.
    pub fn pause(&mut self) -> Option<Event> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        self.flush_elapsed();
        if self.remaining_ms == 0 {
            return None;
        }
        self.phase = TimerPhase::Paused;
        self.last_instant = None;
        Some(Event::TimerPaused {
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.phase != TimerPhase::Paused {
            return None;
        }
        self.phase = TimerPhase::Running;
        self.last_instant = Some(self.clock.now());
        Some(Event::TimerResumed {
            remaining_ms: self.remaining_ms,
            at: Utc::now(),
        })
    }

    /// Finish immediately, regardless of remaining time.
    pub fn skip(&mut self) -> Option<Event> {
        if !self.is_active() {
            return None;
        }
        self.flush_elapsed();
        Some(self.finish(true))
    }

    /// Back to Idle with the full duration restored. Never completes.
    pub fn reset(&mut self) -> Option<Event> {
        self.phase = TimerPhase::Idle;
        self.last_instant = None;
        self.remaining_ms = self.total_ms;
        self.reported_secs = 0;
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Like `reset`, but reports the abandoned session if one was active.
    pub fn quit(&mut self) -> Option<Event> {
        let was_active = self.is_active();
        let remaining_ms = self.remaining_ms();
        self.reset();
        was_active.then(|| Event::SessionAbandoned {
            kind: self.kind,
            remaining_ms,
            at: Utc::now(),
        })
    }

    /// Call periodically. While Running, yields a `TimerTick` for each new
    /// whole second of elapsed time (one per call at most) and, on expiry,
    /// a final zero tick followed by `TimerCompleted`.
    pub fn tick(&mut self) -> Vec<Event> {
        if self.phase != TimerPhase::Running {
            return Vec::new();
        }
        self.flush_elapsed();

        if self.remaining_ms == 0 {
            return vec![
                Event::TimerTick {
                    remaining_ms: 0,
                    progress: 1.0,
                    at: Utc::now(),
                },
                self.finish(false),
            ];
        }

        let elapsed_secs = (self.total_ms - self.remaining_ms) / 1000;
        if elapsed_secs > self.reported_secs {
            self.reported_secs = elapsed_secs;
            return vec![Event::TimerTick {
                remaining_ms: self.remaining_ms,
                progress: progress_of(self.total_ms, self.remaining_ms),
                at: Utc::now(),
            }];
        }
        Vec::new()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish(&mut self, skipped: bool) -> Event {
        self.phase = TimerPhase::Finished;
        self.last_instant = None;
        if !skipped {
            self.remaining_ms = 0;
        }
        Event::TimerCompleted {
            kind: self.kind,
            skipped,
            at: Utc::now(),
        }
    }

    /// Move whole elapsed milliseconds into `remaining_ms`. The anchor
    /// advances by exactly the amount counted, so sub-millisecond remainders
    /// carry over to the next flush.
    fn flush_elapsed(&mut self) {
        if let Some(last) = self.last_instant {
            let elapsed = elapsed_ms(last, self.clock.now());
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            self.last_instant = Some(last + Duration::from_millis(elapsed));
        }
    }
}

impl std::fmt::Debug for SessionTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTimer")
            .field("phase", &self.phase)
            .field("kind", &self.kind)
            .field("total_ms", &self.total_ms)
            .field("remaining_ms", &self.remaining_ms)
            .finish()
    }
}

fn elapsed_ms(from: Instant, to: Instant) -> u64 {
    to.saturating_duration_since(from).as_millis() as u64
}

fn progress_of(total_ms: u64, remaining_ms: u64) -> f64 {
    if total_ms == 0 {
        return 0.0;
    }
    let done = total_ms.saturating_sub(remaining_ms) as f64;
    (done / total_ms as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;

    const WORK_MS: u64 = 1_500_000;

    fn timer() -> (Arc<ManualClock>, SessionTimer) {
        let clock = Arc::new(ManualClock::new());
        let timer = SessionTimer::new(clock.clone());
        (clock, timer)
    }

    fn completions(events: &[Event]) -> usize {
        events.iter().filter(|e| e.is_completion()).count()
    }

    #[test]
    fn start_pause_resume() {
        let (_clock, mut t) = timer();
        assert_eq!(t.phase(), TimerPhase::Idle);

        assert!(t.start(WORK_MS, SessionKind::Work).is_some());
        assert_eq!(t.phase(), TimerPhase::Running);

        assert!(t.pause().is_some());
        assert_eq!(t.phase(), TimerPhase::Paused);

        assert!(t.resume().is_some());
        assert_eq!(t.phase(), TimerPhase::Running);
    }

    #[test]
    fn invalid_transitions_are_noops() {
        let (_clock, mut t) = timer();
        assert!(t.pause().is_none());
        assert!(t.resume().is_none());
        assert!(t.skip().is_none());
        assert!(t.tick().is_empty());
        assert_eq!(t.phase(), TimerPhase::Idle);

        t.start(WORK_MS, SessionKind::Work);
        assert!(t.resume().is_none());
        assert!(t.start(1000, SessionKind::Meditation).is_none());
        assert_eq!(t.total_ms(), WORK_MS);
    }

    #[test]
    fn zero_duration_does_not_start() {
        let (_clock, mut t) = timer();
        assert!(t.start(0, SessionKind::Work).is_none());
        assert_eq!(t.phase(), TimerPhase::Idle);
    }

    #[test]
    fn skip_finishes_with_one_completion() {
        let (_clock, mut t) = timer();
        t.start(WORK_MS, SessionKind::Work);
        let event = t.skip().unwrap();
        assert!(matches!(event, Event::TimerCompleted { skipped: true, .. }));
        assert_eq!(t.phase(), TimerPhase::Finished);
        assert!(t.skip().is_none());
        assert!(t.tick().is_empty());
    }

    #[test]
    fn skip_while_paused_finishes() {
        let (_clock, mut t) = timer();
        t.start(WORK_MS, SessionKind::Work);
        t.pause();
        assert!(t.skip().is_some());
        assert_eq!(t.phase(), TimerPhase::Finished);
    }

    #[test]
    fn ticks_follow_elapsed_time_not_call_count() {
        let (clock, mut t) = timer();
        t.start(10_000, SessionKind::Work);

        assert!(t.tick().is_empty());
        clock.advance_ms(999);
        assert!(t.tick().is_empty());
        clock.advance_ms(1);
        match t.tick().as_slice() {
            [Event::TimerTick { remaining_ms, .. }] => assert_eq!(*remaining_ms, 9_000),
            other => panic!("unexpected events: {other:?}"),
        }

        // A long gap yields one tick reporting real time.
        clock.advance_ms(4_500);
        match t.tick().as_slice() {
            [Event::TimerTick { remaining_ms, .. }] => assert_eq!(*remaining_ms, 4_500),
            other => panic!("unexpected events: {other:?}"),
        }
        assert!(t.tick().is_empty());
    }

    #[test]
    fn expiry_reports_zero_then_completes_once() {
        let (clock, mut t) = timer();
        t.start(3_000, SessionKind::Meditation);
        clock.advance_ms(10_000);

        let events = t.tick();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::TimerTick { remaining_ms: 0, .. }));
        assert!(matches!(
            events[1],
            Event::TimerCompleted { kind: SessionKind::Meditation, skipped: false, .. }
        ));
        assert_eq!(t.phase(), TimerPhase::Finished);
        assert_eq!(t.remaining_ms(), 0);

        clock.advance_ms(5_000);
        assert_eq!(completions(&t.tick()), 0);
    }

    #[test]
    fn paused_time_does_not_count() {
        let (clock, mut t) = timer();
        t.start(60_000, SessionKind::Work);
        clock.advance_ms(20_000);
        t.pause();
        assert_eq!(t.remaining_ms(), 40_000);

        clock.advance_ms(600_000);
        assert_eq!(t.remaining_ms(), 40_000);
        assert!(t.tick().is_empty());

        t.resume();
        clock.advance_ms(39_999);
        assert_eq!(completions(&t.tick()), 0);
        clock.advance_ms(1);
        assert_eq!(completions(&t.tick()), 1);
    }

    #[test]
    fn pause_after_silent_expiry_leaves_completion_to_tick() {
        let (clock, mut t) = timer();
        t.start(1_000, SessionKind::Work);
        clock.advance_ms(2_000);
        assert!(t.pause().is_none());
        assert_eq!(t.phase(), TimerPhase::Running);
        assert_eq!(completions(&t.tick()), 1);
    }

    #[test]
    fn reset_restores_total_without_completion() {
        let (clock, mut t) = timer();
        t.start(WORK_MS, SessionKind::Work);
        clock.advance_ms(5_000);
        t.tick();

        let event = t.reset().unwrap();
        assert!(matches!(event, Event::TimerReset { .. }));
        assert_eq!(t.phase(), TimerPhase::Idle);
        assert_eq!(t.remaining_ms(), WORK_MS);

        clock.advance_ms(WORK_MS);
        assert!(t.tick().is_empty());
    }

    #[test]
    fn quit_reports_abandonment_only_for_active_sessions() {
        let (clock, mut t) = timer();
        assert!(t.quit().is_none());

        t.start(WORK_MS, SessionKind::Work);
        clock.advance_ms(60_000);
        match t.quit() {
            Some(Event::SessionAbandoned { remaining_ms, .. }) => {
                assert_eq!(remaining_ms, WORK_MS - 60_000)
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(t.phase(), TimerPhase::Idle);
    }

    #[test]
    fn progress_is_clamped() {
        let (clock, mut t) = timer();
        assert_eq!(t.progress(), 0.0);
        t.start(4_000, SessionKind::Work);
        clock.advance_ms(1_000);
        assert!((t.progress() - 0.25).abs() < f64::EPSILON);
        clock.advance_ms(100_000);
        assert_eq!(t.progress(), 1.0);
    }

    #[test]
    fn configure_is_ignored_mid_session() {
        let (_clock, mut t) = timer();
        t.configure(600_000, SessionKind::Meditation);
        assert_eq!(t.snapshot().total_ms, 600_000);
        assert_eq!(t.kind(), SessionKind::Meditation);

        t.start(WORK_MS, SessionKind::Work);
        t.configure(600_000, SessionKind::Meditation);
        assert_eq!(t.kind(), SessionKind::Work);
        assert_eq!(t.total_ms(), WORK_MS);
    }

    #[test]
    fn frequent_polling_does_not_lose_time() {
        let (clock, mut t) = timer();
        t.start(10_000, SessionKind::Work);
        for _ in 0..1_000 {
            clock.advance(Duration::from_micros(1_500));
            t.tick();
        }
        assert_eq!(t.remaining_ms(), 8_500);
    }

    #[test]
    fn sub_millisecond_remainders_survive_pause() {
        let (clock, mut t) = timer();
        t.start(10_000, SessionKind::Work);
        for _ in 0..4 {
            clock.advance(Duration::from_micros(250));
            t.tick();
        }
        t.pause();
        assert_eq!(t.snapshot().remaining_ms, 9_999);
    }
}
