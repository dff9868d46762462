//! Durability of the project store against a real SQLite file.

use std::sync::Arc;

use focusleaf_core::project::PROJECTS_KEY;
use focusleaf_core::{
    Database, KvStore, Priority, ProjectInput, ProjectPatch, ProjectStore, StatsAggregator,
};
use proptest::prelude::*;

#[test]
fn restart_loads_last_published_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focusleaf.db");

    let published = {
        let store = ProjectStore::open(Arc::new(Database::open_at(&path).unwrap()));
        let a = store
            .create(
                ProjectInput::new("Writing")
                    .priority(Priority::High)
                    .color("#ECD6FF")
                    .tasks(3, 25)
                    .sessions(2),
            )
            .unwrap();
        store.create(ProjectInput::new("Cleaning")).unwrap();
        store.record_session(&a.id, 25).unwrap();
        store.set_completion(&a.id, true).unwrap();
        store.all()
    };

    let reopened = ProjectStore::open(Arc::new(Database::open_at(&path).unwrap()));
    assert_eq!(reopened.all(), published);
    assert_eq!(StatsAggregator::attach(&reopened).current().total_tasks, 1);
}

#[test]
fn corrupt_database_value_degrades_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("focusleaf.db");
    Database::open_at(&path)
        .unwrap()
        .set(PROJECTS_KEY, r#"[{"id": 7}]"#)
        .unwrap();

    let store = ProjectStore::open(Arc::new(Database::open_at(&path).unwrap()));
    assert!(store.is_empty());
}

#[derive(Debug, Clone)]
enum Op {
    Create(String),
    Rename(usize, String),
    Toggle(usize, bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(Op::Create),
        (any::<usize>(), "[a-z]{1,8}").prop_map(|(i, n)| Op::Rename(i, n)),
        (any::<usize>(), any::<bool>()).prop_map(|(i, b)| Op::Toggle(i, b)),
    ]
}

proptest! {
    #[test]
    fn all_reflects_latest_update_in_insertion_order(ops in prop::collection::vec(op(), 1..30)) {
        let store = ProjectStore::open(Arc::new(Database::open_memory().unwrap()));
        // Expected state: (id, name, completed) in insertion order.
        let mut expected: Vec<(String, String, bool)> = Vec::new();

        for op in ops {
            match op {
                Op::Create(name) => {
                    let p = store.create(ProjectInput::new(name.clone())).unwrap();
                    expected.push((p.id, name, false));
                }
                Op::Rename(i, name) if !expected.is_empty() => {
                    let idx = i % expected.len();
                    let slot = &mut expected[idx];
                    let patch = ProjectPatch {
                        name: Some(name.clone()),
                        ..ProjectPatch::default()
                    };
                    store.update(&slot.0, &patch).unwrap();
                    slot.1 = name;
                }
                Op::Toggle(i, done) if !expected.is_empty() => {
                    let idx = i % expected.len();
                    let slot = &mut expected[idx];
                    store.set_completion(&slot.0, done).unwrap();
                    slot.2 = done;
                }
                _ => {}
            }
        }

        let actual: Vec<(String, String, bool)> = store
            .all()
            .into_iter()
            .map(|p| (p.id, p.name, p.is_completed))
            .collect();
        prop_assert_eq!(actual, expected);
    }
}
