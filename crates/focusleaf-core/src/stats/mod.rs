//! Statistics module for FocusLeaf
//!
//! Derived values computed from the project collection: totals over active
//! projects (kept live by [`StatsAggregator`]), per-project session
//! progress, and an overall focus summary.

mod aggregator;
mod overall;
mod progress;

pub use aggregator::StatsAggregator;
pub use overall::{compute_stats, OverallStats};
pub use progress::{
    focus_summary, format_clock, format_hms, project_progress, FocusSummary, ProjectProgress,
    MINUTES_PER_SESSION,
};
