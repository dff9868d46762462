//! Durable, observable project collection.
//!
//! The store is the only writer of project data. Each mutation runs under a
//! single write lock and follows the same sequence: apply to a copy of the
//! current snapshot, commit the copy to the [`KvStore`], swap it in, then
//! publish it to observers. A failed validation or write returns before the
//! swap, so the published snapshot always equals what a restart would load.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::model::{Project, ProjectInput, ProjectPatch};
use crate::error::{CoreError, Result, StorageError};
use crate::observe::{Broadcaster, Subscription};
use crate::storage::KvStore;

/// Key under which the serialized collection lives.
pub const PROJECTS_KEY: &str = "projects";

pub struct ProjectStore {
    kv: Arc<dyn KvStore>,
    write_lock: Mutex<()>,
    snapshot: RwLock<Arc<Vec<Project>>>,
    observers: Broadcaster<Vec<Project>>,
}

impl ProjectStore {
    /// Load the stored collection. Missing, unreadable or corrupt data
    /// yields an empty store.
    pub fn open(kv: Arc<dyn KvStore>) -> Self {
        let projects = load_projects(kv.as_ref());
        debug!(count = projects.len(), "project store loaded");
        Self {
            kv,
            write_lock: Mutex::new(()),
            snapshot: RwLock::new(Arc::new(projects)),
            observers: Broadcaster::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The latest published snapshot, in insertion order.
    pub fn snapshot(&self) -> Arc<Vec<Project>> {
        let guard = self.snapshot.read().unwrap_or_else(|p| p.into_inner());
        Arc::clone(&*guard)
    }

    pub fn all(&self) -> Vec<Project> {
        self.snapshot().as_ref().clone()
    }

    pub fn get(&self, id: &str) -> Option<Project> {
        self.snapshot().iter().find(|p| p.id == id).cloned()
    }

    /// Projects that are not completed, in insertion order.
    pub fn active(&self) -> Vec<Project> {
        self.snapshot()
            .iter()
            .filter(|p| p.is_active())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Observe the collection. `observer` is called immediately with the
    /// current snapshot and again after every successful mutation.
    ///
    /// Must not be called from inside a store observer.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: FnMut(&Vec<Project>) + Send + 'static,
    {
        let _guard = self.lock_writes();
        let current = self.snapshot();
        self.observers
            .subscribe_with_initial(Some(current.as_ref()), observer)
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub fn create(&self, input: ProjectInput) -> Result<Project> {
        let project = input.into_project(Uuid::new_v4().to_string(), Utc::now())?;
        let created = self.commit(|projects| {
            projects.push(project.clone());
            Ok(project)
        })?;
        info!(id = %created.id, name = %created.name, "project created");
        Ok(created)
    }

    pub fn update(&self, id: &str, patch: &ProjectPatch) -> Result<Project> {
        self.modify(id, |project| {
            patch.apply_to(project)?;
            Ok(())
        })
    }

    pub fn set_completion(&self, id: &str, completed: bool) -> Result<Project> {
        self.update(id, &ProjectPatch::completion(completed))
    }

    /// Count one finished session of `minutes` towards the project.
    pub fn record_session(&self, id: &str, minutes: u32) -> Result<Project> {
        self.modify(id, |project| {
            project.completed_sessions = project.completed_sessions.saturating_add(1);
            project.total_focus_minutes = project.total_focus_minutes.saturating_add(minutes);
            Ok(())
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn modify<F>(&self, id: &str, f: F) -> Result<Project>
    where
        F: FnOnce(&mut Project) -> Result<()>,
    {
        self.commit(|projects| {
            let project = projects
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| CoreError::not_found(id))?;
            f(project)?;
            Ok(project.clone())
        })
    }

    fn commit<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Vec<Project>) -> Result<R>,
    {
        let _guard = self.lock_writes();
        let mut next = self.snapshot().as_ref().clone();
        let out = f(&mut next)?;

        if let Err(e) = self.persist(&next) {
            warn!(error = %e, "failed to persist projects; snapshot unchanged");
            return Err(e.into());
        }

        let next = Arc::new(next);
        *self.snapshot.write().unwrap_or_else(|p| p.into_inner()) = Arc::clone(&next);
        debug!(count = next.len(), "publishing project snapshot");
        self.observers.publish(next.as_ref());
        Ok(out)
    }

    fn persist(&self, projects: &[Project]) -> Result<(), StorageError> {
        let json = serde_json::to_string(projects)?;
        self.kv.set(PROJECTS_KEY, &json)
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|p| p.into_inner())
    }
}

fn load_projects(kv: &dyn KvStore) -> Vec<Project> {
    let raw = match kv.get(PROJECTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(error = %e, "could not read stored projects; starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Vec<Project>>(&raw) {
        Ok(projects) => projects,
        Err(e) => {
            warn!(error = %e, "stored projects are corrupt; starting empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::storage::MemoryKv;

    fn store() -> (Arc<MemoryKv>, ProjectStore) {
        let kv = Arc::new(MemoryKv::new());
        let store = ProjectStore::open(kv.clone());
        (kv, store)
    }

    #[test]
    fn create_assigns_fresh_ids() {
        let (_kv, store) = store();
        let a = store.create(ProjectInput::new("A")).unwrap();
        let b = store.create(ProjectInput::new("B")).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.all(), vec![a, b]);
    }

    #[test]
    fn create_rejects_empty_name_without_mutation() {
        let (kv, store) = store();
        let err = store.create(ProjectInput::new("")).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::EmptyName)));
        assert!(store.is_empty());
        assert!(kv.get(PROJECTS_KEY).unwrap().is_none());
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let (_kv, store) = store();
        store.create(ProjectInput::new("A")).unwrap();
        let before = store.all();
        let err = store.set_completion("missing", true).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { ref id } if id == "missing"));
        assert_eq!(store.all(), before);
    }

    #[test]
    fn update_applies_patch_in_place() {
        let (_kv, store) = store();
        let a = store.create(ProjectInput::new("A")).unwrap();
        let b = store.create(ProjectInput::new("B")).unwrap();
        let patch = ProjectPatch {
            name: Some("A2".into()),
            ..ProjectPatch::default()
        };
        store.update(&a.id, &patch).unwrap();
        let names: Vec<_> = store.all().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["A2", "B"]);
        assert_eq!(store.get(&b.id).unwrap(), b);
    }

    #[test]
    fn subscriber_gets_current_snapshot_then_changes() {
        let (_kv, store) = store();
        store.create(ProjectInput::new("A")).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(move |projects| sink.lock().unwrap().push(projects.len()));

        store.create(ProjectInput::new("B")).unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn failed_write_keeps_snapshot_and_skips_publish() {
        let (kv, store) = store();
        let a = store.create(ProjectInput::new("A")).unwrap();

        let seen = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(move |_| *sink.lock().unwrap() += 1);

        kv.set_fail_writes(true);
        let err = store.set_completion(&a.id, true).unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
        assert!(!store.get(&a.id).unwrap().is_completed);
        assert_eq!(*seen.lock().unwrap(), 1);
    }

    #[test]
    fn record_session_accumulates() {
        let (_kv, store) = store();
        let a = store.create(ProjectInput::new("A").sessions(1)).unwrap();
        store.record_session(&a.id, 25).unwrap();
        let p = store.record_session(&a.id, 25).unwrap();
        assert_eq!(p.completed_sessions, 2);
        assert_eq!(p.total_focus_minutes, 50);
    }

    #[test]
    fn active_filters_completed() {
        let (_kv, store) = store();
        let a = store.create(ProjectInput::new("A")).unwrap();
        let b = store.create(ProjectInput::new("B")).unwrap();
        store.set_completion(&a.id, true).unwrap();
        let active: Vec<_> = store.active().into_iter().map(|p| p.id).collect();
        assert_eq!(active, vec![b.id]);
    }

    #[test]
    fn reopen_loads_what_was_published() {
        let (kv, store) = store();
        let a = store.create(ProjectInput::new("A").tasks(3, 20)).unwrap();
        store.record_session(&a.id, 25).unwrap();
        let published = store.all();

        let reopened = ProjectStore::open(kv);
        assert_eq!(reopened.all(), published);
    }

    #[test]
    fn corrupt_storage_degrades_to_empty() {
        let kv = Arc::new(MemoryKv::with_value(PROJECTS_KEY, "{not json"));
        let store = ProjectStore::open(kv);
        assert!(store.is_empty());
        store.create(ProjectInput::new("Fresh")).unwrap();
        assert_eq!(store.len(), 1);
    }
}
