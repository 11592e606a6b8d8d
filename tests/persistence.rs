mod common;

use common::{persist_config, snapshot_path, Counter};
use model_store::{EventKind, Model, Store, StoreConfig, StoreError};

#[test]
fn test_flush_and_rehydrate() {
    let (dir, config) = persist_config(false);

    {
        let store = Store::new(config.clone());
        let model = Model::persisted(&store, "counter", Counter::default()).unwrap();
        model.change_data("bump", |d| {
            d.count = 3;
            d.label = "saved".to_string();
        });
        store.flush().unwrap();
    }

    assert!(snapshot_path(&dir).exists());

    let store = Store::new(config);
    let model = Model::persisted(&store, "counter", Counter::default()).unwrap();
    assert_eq!(model.data().count, 3);
    assert_eq!(model.data().label, "saved");
}

#[test]
fn test_flush_on_commit_writes_immediately() {
    let (dir, config) = persist_config(true);
    let store = Store::new(config);
    let model = Model::persisted(&store, "counter", Counter::default()).unwrap();

    model.change_data("bump", |d| d.count = 8);

    let raw = std::fs::read_to_string(snapshot_path(&dir)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["counter"]["count"], 8);
}

#[test]
fn test_unclaimed_entries_survive_flush() {
    let (dir, config) = persist_config(false);
    std::fs::write(
        snapshot_path(&dir),
        r#"{"other": {"count": 1, "label": "kept"}}"#,
    )
    .unwrap();

    let store = Store::new(config);
    let model = Model::persisted(&store, "counter", Counter::default()).unwrap();
    model.change_data("bump", |d| d.count = 2);
    store.flush().unwrap();

    let raw = std::fs::read_to_string(snapshot_path(&dir)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["other"]["label"], "kept");
    assert_eq!(value["counter"]["count"], 2);
}

#[test]
fn test_plain_models_are_not_persisted() {
    let (dir, config) = persist_config(false);
    let store = Store::new(config);
    let plain = Model::new(&store, "plain", 5u32).unwrap();
    plain.change_data("bump", |n| *n += 1);
    store.flush().unwrap();

    let raw = std::fs::read_to_string(snapshot_path(&dir)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value.get("plain").is_none());
}

#[test]
fn test_undecodable_entry_keeps_initial_data() {
    let (dir, config) = persist_config(false);
    std::fs::write(snapshot_path(&dir), r#"{"counter": "not a counter"}"#).unwrap();

    let store = Store::new(config);
    let model = Model::persisted(&store, "counter", Counter::default()).unwrap();
    assert_eq!(*model.data(), Counter::default());
}

#[test]
fn test_corrupt_file_starts_empty() {
    let (dir, config) = persist_config(false);
    std::fs::write(snapshot_path(&dir), "{ not json").unwrap();

    let store = Store::new(config);
    let model = Model::persisted(&store, "counter", Counter::default()).unwrap();
    assert_eq!(*model.data(), Counter::default());
}

#[test]
fn test_hydration_emits_event() {
    let (dir, config) = persist_config(false);
    std::fs::write(
        snapshot_path(&dir),
        r#"{"counter": {"count": 4, "label": ""}}"#,
    )
    .unwrap();

    let store = Store::new(config);
    let mut events = store.events();
    let model = Model::persisted(&store, "counter", Counter::default()).unwrap();

    assert_eq!(model.data().count, 4);
    let event = events.try_recv().unwrap();
    assert_eq!(event.kind, EventKind::Hydrate);
    assert_eq!(event.action, "counter/hydrate");
}

#[test]
fn test_flush_without_persistence_is_noop() {
    let store = Store::new(StoreConfig::default());
    let _model = Model::persisted(&store, "counter", Counter::default()).unwrap();
    assert!(store.flush().is_ok());
}

#[test]
fn test_unwritable_path_reports_io_error() {
    let (dir, mut config) = persist_config(false);
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "file, not a dir").unwrap();
    config.persist.path = blocker.join("state.json");

    let store = Store::new(config);
    let _model = Model::persisted(&store, "counter", Counter::default()).unwrap();
    let err = store.flush().unwrap_err();
    assert!(matches!(err, StoreError::PersistIo { .. }));
}

#[test]
fn test_reregistered_model_keeps_state_of_dropped_one() {
    let (dir, config) = persist_config(false);
    std::fs::write(
        snapshot_path(&dir),
        r#"{"counter": {"count": 4, "label": "loaded"}}"#,
    )
    .unwrap();

    let store = Store::new(config);
    let first = Model::persisted(&store, "counter", Counter::default()).unwrap();
    assert_eq!(first.data().count, 4);
    drop(first);

    let second = Model::persisted(&store, "counter", Counter::default()).unwrap();
    assert_eq!(second.data().count, 4);
    second.change_data("bump", |d| d.count = 6);
    drop(second);

    // Nothing registered under the name now; its last data is still written.
    store.flush().unwrap();
    let raw = std::fs::read_to_string(snapshot_path(&dir)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["counter"]["count"], 6);
    assert_eq!(value["counter"]["label"], "loaded");

    let third = Model::persisted(&store, "counter", Counter::default()).unwrap();
    assert_eq!(third.data().count, 6);
}

#[test]
fn test_rejected_duplicate_leaves_stored_entry_alone() {
    let (dir, config) = persist_config(false);
    let store = Store::new(config);
    let model = Model::persisted(&store, "counter", Counter::default()).unwrap();
    model.change_data("bump", |d| d.count = 9);

    let err = Model::persisted(&store, "counter", Counter::default()).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateModel { .. }));
    drop(model);

    store.flush().unwrap();
    let raw = std::fs::read_to_string(snapshot_path(&dir)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["counter"]["count"], 9);
}

#[test]
fn test_concurrent_commits_leave_newest_snapshot_on_disk() {
    let (dir, config) = persist_config(true);
    let store = Store::new(config);
    let model = Model::persisted(&store, "counter", Counter::default()).unwrap();

    let writers: Vec<_> = (0..4)
        .map(|_| {
            let model = model.clone();
            std::thread::spawn(move || {
                for _ in 0..25 {
                    model.change_data("bump", |d| d.count += 1);
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(model.data().count, 100);
    let raw = std::fs::read_to_string(snapshot_path(&dir)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["counter"]["count"], 100);
}
