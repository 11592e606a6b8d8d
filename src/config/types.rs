use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest accepted `store.event_capacity`.
pub const MAX_EVENT_CAPACITY: usize = 1 << 16;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub persist: PersistConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Store-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Buffered events per observer before the slowest one lags (default: 256).
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

/// Snapshot persistence for models created with `Model::persisted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistConfig {
    #[serde(default)]
    pub enabled: bool,
    /// JSON snapshot file (default: `<data_dir>/model-store/state.json`).
    #[serde(default = "default_persist_path")]
    pub path: PathBuf,
    /// Write the snapshot after every commit to a persisted slice.
    #[serde(default)]
    pub flush_on_commit: bool,
}

/// Logging settings consumed by `logging::init_tracing`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// EnvFilter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Log to this file instead of stderr.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_event_capacity() -> usize {
    256
}

fn default_persist_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("model-store")
        .join("state.json")
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
        }
    }
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_persist_path(),
            flush_on_commit: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}
