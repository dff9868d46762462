//! Live statistics over the project store.
//!
//! The aggregator subscribes to the store once, on construction, and
//! recomputes [`OverallStats`] synchronously for every snapshot the store
//! publishes. Recomputation does no I/O. Each result is stored as the
//! current value and then published to the aggregator's own observers, so
//! by the time a store mutation returns every stats observer has seen its
//! effect exactly once.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tracing::debug;

use super::overall::{compute_stats, OverallStats};
use crate::observe::{Broadcaster, Subscription};
use crate::project::ProjectStore;

struct Shared {
    latest: RwLock<OverallStats>,
    /// Held while a value is being stored and delivered, and while a new
    /// observer is registered, so no observer misses a value.
    delivery: Mutex<()>,
    observers: Broadcaster<OverallStats>,
}

impl Shared {
    fn deliver(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn current(&self) -> OverallStats {
        *self.latest.read().unwrap_or_else(|p| p.into_inner())
    }
}

pub struct StatsAggregator {
    shared: Arc<Shared>,
    store_subscription: Mutex<Option<Subscription>>,
}

impl StatsAggregator {
    /// Start tracking `store`. The current value is computed immediately
    /// from the store's snapshot.
    pub fn attach(store: &ProjectStore) -> Self {
        let shared = Arc::new(Shared {
            latest: RwLock::new(OverallStats::default()),
            delivery: Mutex::new(()),
            observers: Broadcaster::new(),
        });

        let sink = Arc::clone(&shared);
        let subscription = store.subscribe(move |projects| {
            let stats = compute_stats(projects);
            let _guard = sink.deliver();
            *sink.latest.write().unwrap_or_else(|p| p.into_inner()) = stats;
            debug!(
                total_tasks = stats.total_tasks,
                total_minutes = stats.total_minutes,
                "stats recomputed"
            );
            sink.observers.publish(&stats);
        });

        Self {
            shared,
            store_subscription: Mutex::new(Some(subscription)),
        }
    }

    /// The most recently computed value.
    pub fn current(&self) -> OverallStats {
        self.shared.current()
    }

    /// Observe the statistics. `observer` receives the current value
    /// immediately and every recomputed value afterwards.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: FnMut(&OverallStats) + Send + 'static,
    {
        let _guard = self.shared.deliver();
        let current = self.shared.current();
        self.shared
            .observers
            .subscribe_with_initial(Some(&current), observer)
    }

    /// Stop following the store. The current value is frozen.
    pub fn detach(&self) {
        let subscription = self
            .store_subscription
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
    }

    pub fn is_attached(&self) -> bool {
        self.store_subscription
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }
}
