//! Explicit store handle shared by every model of an application.
//!
//! Each model slice lives inside its model; the store keeps a registry of
//! weak handles to them, serializes writes, and fans out [`StoreEvent`]s.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::persist::Persistor;
use super::{StoreError, StoreEvent};
use crate::config::{StoreConfig, MAX_EVENT_CAPACITY};

/// Store-side view of one registered model.
pub(crate) trait SliceHandle: Send + Sync {
    /// Restores the initial data.
    fn reset(&self);

    /// Encodes the current data. `None` for models that are not persisted.
    fn snapshot(&self) -> Option<Result<Value, StoreError>>;
}

/// Cheap-clone handle to a store.
///
/// Models take a `&Store` at construction; there is no global store.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    config: StoreConfig,
    slices: Mutex<BTreeMap<String, Weak<dyn SliceHandle>>>,
    /// Held for the duration of every slice write. Reentrant, so a reducer
    /// may write other models of the same store.
    write_lock: ReentrantMutex<()>,
    events: broadcast::Sender<StoreEvent>,
    persistor: Option<Persistor>,
}

impl Store {
    /// Create a store. When persistence is enabled, the snapshot file is
    /// read now and its entries wait for their models to register.
    ///
    /// `event_capacity` is clamped to `1..=MAX_EVENT_CAPACITY`; configs that
    /// went through `StoreConfig::validate` are already inside that range.
    pub fn new(config: StoreConfig) -> Self {
        let requested = config.store.event_capacity;
        let capacity = requested.clamp(1, MAX_EVENT_CAPACITY);
        if capacity != requested {
            warn!(requested, capacity, "event capacity out of range, clamped");
        }
        let (events, _) = broadcast::channel(capacity);
        let persistor = config
            .persist
            .enabled
            .then(|| Persistor::open(&config.persist));

        Self {
            inner: Arc::new(StoreInner {
                config,
                slices: Mutex::new(BTreeMap::new()),
                write_lock: ReentrantMutex::new(()),
                events,
                persistor,
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Subscribe to every transition committed after this call.
    pub fn events(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events.subscribe()
    }

    /// Names of the live models, sorted.
    pub fn model_names(&self) -> Vec<String> {
        let mut slices = self.inner.slices.lock();
        slices.retain(|_, handle| handle.strong_count() > 0);
        slices.keys().cloned().collect()
    }

    /// Restores every live model to its initial data.
    pub fn reset_all(&self) {
        for handle in self.live_handles() {
            handle.reset();
        }
    }

    /// Writes the snapshot of every persisted model.
    ///
    /// Does nothing when persistence is disabled. Concurrent flushes are
    /// serialized and each one reads the slices only once it holds the
    /// file, so the last write always carries the newest data.
    pub fn flush(&self) -> Result<(), StoreError> {
        let Some(persistor) = self.inner.persistor.as_ref() else {
            return Ok(());
        };

        // Upgraded before the persistor lock and released after it: a model
        // whose last handle drops here stashes its snapshot in the persistor.
        let slices: Vec<(String, Arc<dyn SliceHandle>)> = {
            let slices = self.inner.slices.lock();
            slices
                .iter()
                .filter_map(|(name, weak)| weak.upgrade().map(|h| (name.clone(), h)))
                .collect()
        };

        persistor.write_with(|| {
            let mut live = Map::new();
            for (name, handle) in &slices {
                if let Some(snapshot) = handle.snapshot() {
                    live.insert(name.clone(), snapshot?);
                }
            }
            Ok(live)
        })
    }

    pub(crate) fn register(
        &self,
        name: &str,
        handle: Weak<dyn SliceHandle>,
    ) -> Result<(), StoreError> {
        let mut slices = self.inner.slices.lock();
        if slices.get(name).is_some_and(|h| h.strong_count() > 0) {
            return Err(StoreError::DuplicateModel {
                name: name.to_string(),
            });
        }
        slices.insert(name.to_string(), handle);
        info!(model = name, "model registered");
        Ok(())
    }

    /// The stored snapshot entry of `model`, if persistence has one.
    pub(crate) fn claim_snapshot(&self, model: &str) -> Option<Value> {
        self.inner.persistor.as_ref()?.claim(model)
    }

    /// Records the final snapshot of a persisted model being dropped, so a
    /// later model with the same name and the next flush both see it.
    pub(crate) fn stash_snapshot(&self, model: &str, value: Value) {
        if let Some(persistor) = self.inner.persistor.as_ref() {
            persistor.stash(model, value);
        }
    }

    pub(crate) fn write_lock(&self) -> ReentrantMutexGuard<'_, ()> {
        self.inner.write_lock.lock()
    }

    pub(crate) fn emit(&self, event: StoreEvent) {
        debug!(action = %event.action, kind = ?event.kind, "store event");
        // No receivers is fine.
        let _ = self.inner.events.send(event);
    }

    /// Hook run after a persisted slice was written.
    pub(crate) fn persisted_commit(&self) -> Result<(), StoreError> {
        match self.inner.persistor.as_ref() {
            Some(persistor) if persistor.flush_on_commit() => self.flush(),
            _ => Ok(()),
        }
    }

    fn live_handles(&self) -> Vec<Arc<dyn SliceHandle>> {
        self.inner
            .slices
            .lock()
            .values()
            .filter_map(Weak::upgrade)
            .collect()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("models", &self.model_names())
            .finish()
    }
}
