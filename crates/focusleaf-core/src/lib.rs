//! # FocusLeaf Core Library
//!
//! This library provides the core logic for the FocusLeaf focus-session
//! tracker: a countdown timer for Pomodoro-style sessions, a durable store of
//! user projects, and statistics that stay current as projects change. The
//! CLI is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Session Timer**: A monotonic-clock countdown state machine that
//!   requires the caller to periodically invoke `tick()`
//! - **Project Store**: Project collection persisted as one JSON value in a
//!   key-value backend (SQLite by default), published to observers after
//!   every committed change
//! - **Statistics**: Pure totals over active projects plus an aggregator
//!   that recomputes them on every store snapshot
//! - **Session Orchestrator**: Lifecycle operations that tie timer
//!   completion to project bookkeeping
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: Core timer state machine
//! - [`ProjectStore`]: Project persistence and change notification
//! - [`StatsAggregator`]: Live [`OverallStats`]
//! - [`SessionOrchestrator`]: start / pause / resume / skip / quit
//! - [`FocusLeaf`]: Wires the above together

pub mod error;
pub mod events;
pub mod observe;
pub mod project;
pub mod services;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use observe::{Broadcaster, Subscription};
pub use project::{Priority, Project, ProjectInput, ProjectPatch, ProjectStore};
pub use services::FocusLeaf;
pub use session::{SessionIndicator, SessionOrchestrator};
pub use stats::{compute_stats, OverallStats, StatsAggregator};
pub use storage::{Config, Database, KvStore, MemoryKv};
pub use timer::{
    Clock, ManualClock, MonotonicClock, SessionKind, SessionTimer, TimerPhase, TimerSnapshot,
};
