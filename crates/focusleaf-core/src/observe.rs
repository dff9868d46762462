//! Synchronous publish/subscribe.
//!
//! A [`Broadcaster`] holds an ordered list of observers and delivers each
//! published value to all of them, in subscription order, before
//! `publish` returns. Subscribing hands back a [`Subscription`] guard;
//! dropping the guard (or calling [`Subscription::unsubscribe`]) removes
//! that observer and no other.
//!
//! Observers run while the observer list is locked, so an observer must
//! not subscribe to, unsubscribe from, or publish on the broadcaster that
//! is calling it.

use std::sync::{Arc, Mutex, MutexGuard, Weak};

type Observer<T> = Box<dyn FnMut(&T) + Send>;

struct Registry<T> {
    next_id: u64,
    observers: Vec<(u64, Observer<T>)>,
}

/// Ordered observer list with synchronous delivery.
pub struct Broadcaster<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> Broadcaster<T> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                observers: Vec::new(),
            })),
        }
    }

    /// Register an observer. It receives every value published from now on.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.subscribe_with_initial(None, observer)
    }

    /// Register an observer and deliver `initial` to it (and only it)
    /// before it becomes visible to `publish`.
    ///
    /// Holding the registry lock across the initial delivery means no
    /// concurrent publish can slip in between the initial value and the
    /// registration.
    pub fn subscribe_with_initial<F>(&self, initial: Option<&T>, mut observer: F) -> Subscription
    where
        F: FnMut(&T) + Send + 'static,
    {
        let mut registry = lock(&self.registry);
        if let Some(value) = initial {
            observer(value);
        }
        let id = registry.next_id;
        registry.next_id += 1;
        registry.observers.push((id, Box::new(observer)));

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    lock(&registry).observers.retain(|(oid, _)| *oid != id);
                }
            })),
        }
    }

    /// Deliver `value` to every observer, in subscription order.
    pub fn publish(&self, value: &T) {
        let mut registry = lock(&self.registry);
        for (_, observer) in registry.observers.iter_mut() {
            observer(value);
        }
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.registry).observers.len()
    }
}

impl<T: 'static> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`Broadcaster::subscribe`].
///
/// The observer stays registered for as long as this value is alive.
#[must_use = "dropping a Subscription unsubscribes its observer"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Remove the observer. No callback reaches it after this returns.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

// An observer that panicked poisons the registry; the observer list itself
// is still consistent, so keep serving the remaining observers.
fn lock<T>(registry: &Mutex<Registry<T>>) -> MutexGuard<'_, Registry<T>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
