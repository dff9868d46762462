//! Explicitly constructed service graph.
//!
//! [`FocusLeaf`] wires the store, the aggregator and the orchestrator
//! together. There is no global state: build one with [`FocusLeaf::init`],
//! hand references to the presentation layer, and call
//! [`FocusLeaf::shutdown`] when done.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::project::ProjectStore;
use crate::session::SessionOrchestrator;
use crate::stats::StatsAggregator;
use crate::storage::{Config, Database, KvStore};
use crate::timer::{Clock, MonotonicClock};

pub struct FocusLeaf {
    pub store: Arc<ProjectStore>,
    pub stats: StatsAggregator,
    pub sessions: SessionOrchestrator,
}

impl FocusLeaf {
    /// Load the project collection from `kv` and start the aggregator.
    pub fn init(kv: Arc<dyn KvStore>, config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let store = Arc::new(ProjectStore::open(kv));
        let stats = StatsAggregator::attach(&store);
        let sessions = SessionOrchestrator::new(Arc::clone(&store), config.timer.clone(), clock);
        debug!(projects = store.len(), "services initialised");
        Ok(Self {
            store,
            stats,
            sessions,
        })
    }

    /// Open the configured SQLite database in the data directory and use
    /// the real monotonic clock.
    pub fn open_default(config: &Config) -> Result<Self> {
        let db = Database::open(&config.storage.database_file)?;
        Self::init(Arc::new(db), config, Arc::new(MonotonicClock))
    }

    /// Abandon any running session and stop recomputing statistics.
    pub fn shutdown(mut self) {
        self.sessions.shutdown();
        self.stats.detach();
        debug!("services shut down");
    }
}
