//! Shared test models and helpers.

#![allow(dead_code, unused_imports)]

use std::path::PathBuf;

use model_store::config::PersistConfig;
use model_store::mvi::{Intent, Reducer};
use model_store::{Model, Store, StoreConfig, StoreEvent};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Counter {
    pub count: u32,
    pub label: String,
}

pub enum CounterIntent {
    Add(u32),
    Rename(String),
}

impl Intent for CounterIntent {
    fn label(&self) -> &'static str {
        match self {
            CounterIntent::Add(_) => "add",
            CounterIntent::Rename(_) => "rename",
        }
    }
}

pub struct CounterReducer;

impl Reducer for CounterReducer {
    type State = Counter;
    type Intent = CounterIntent;

    fn reduce(mut state: Counter, intent: CounterIntent) -> Counter {
        match intent {
            CounterIntent::Add(n) => state.count += n,
            CounterIntent::Rename(label) => state.label = label,
        }
        state
    }
}

/// A fresh store with a `counter` model at zero.
pub fn counter_model() -> (Store, Model<Counter>) {
    let store = Store::default();
    let model = Model::new(&store, "counter", Counter::default()).expect("register counter");
    (store, model)
}

/// Config persisting into `state.json` inside a new temp dir.
pub fn persist_config(flush_on_commit: bool) -> (TempDir, StoreConfig) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = StoreConfig::default();
    config.persist = PersistConfig {
        enabled: true,
        path: dir.path().join("state.json"),
        flush_on_commit,
    };
    (dir, config)
}

pub fn snapshot_path(dir: &TempDir) -> PathBuf {
    dir.path().join("state.json")
}

/// Every event already queued on `rx`.
pub fn drain(rx: &mut broadcast::Receiver<StoreEvent>) -> Vec<StoreEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
