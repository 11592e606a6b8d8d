//! JSON snapshot file for persisted models.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::PersistConfig;
use crate::store::StoreError;

pub(crate) struct Persistor {
    path: PathBuf,
    flush_on_commit: bool,
    /// Last known entry of every model seen by this store: read at startup,
    /// replaced by live snapshots on flush and by the final snapshot of a
    /// dropped model. The lock is held for a whole flush, so file writes
    /// happen in the order their snapshots were taken.
    entries: Mutex<Map<String, Value>>,
}

impl Persistor {
    /// Opens the snapshot file. A missing or unreadable file starts empty.
    pub(crate) fn open(config: &PersistConfig) -> Self {
        let entries = match read_snapshot(&config.path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %config.path.display(), error = %e, "ignoring unreadable snapshot");
                Map::new()
            }
        };

        Self {
            path: config.path.clone(),
            flush_on_commit: config.flush_on_commit,
            entries: Mutex::new(entries),
        }
    }

    pub(crate) fn flush_on_commit(&self) -> bool {
        self.flush_on_commit
    }

    /// Stored entry for `model`. The entry stays in place until a newer
    /// snapshot of the model replaces it.
    pub(crate) fn claim(&self, model: &str) -> Option<Value> {
        self.entries.lock().get(model).cloned()
    }

    /// Keeps the final snapshot of a model that went away.
    pub(crate) fn stash(&self, model: &str, value: Value) {
        self.entries.lock().insert(model.to_string(), value);
    }

    /// Takes the live snapshots from `collect` and writes them together with
    /// every other known entry.
    ///
    /// `collect` runs under the entries lock; it must not drop the last
    /// handle of a persisted model.
    pub(crate) fn write_with<F>(&self, collect: F) -> Result<(), StoreError>
    where
        F: FnOnce() -> Result<Map<String, Value>, StoreError>,
    {
        let mut entries = self.entries.lock();
        for (name, value) in collect()? {
            entries.insert(name, value);
        }

        let io_err = |source| StoreError::PersistIo {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let body = serde_json::to_vec_pretty(&*entries).map_err(|source| StoreError::Snapshot {
            model: "*".to_string(),
            source,
        })?;

        // Write then rename so readers never see a torn file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        info!(path = %self.path.display(), models = entries.len(), "snapshot flushed");
        Ok(())
    }
}

fn read_snapshot(path: &Path) -> Result<Map<String, Value>, StoreError> {
    if !path.exists() {
        return Ok(Map::new());
    }

    let content = fs::read(path).map_err(|source| StoreError::PersistIo {
        path: path.to_path_buf(),
        source,
    })?;

    match serde_json::from_slice(&content) {
        Ok(Value::Object(entries)) => Ok(entries),
        Ok(_) => Ok(Map::new()),
        Err(source) => Err(StoreError::Snapshot {
            model: "*".to_string(),
            source,
        }),
    }
}
