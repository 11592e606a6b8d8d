use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the store and its models.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Model '{name}' is already registered in this store")]
    DuplicateModel { name: String },

    #[error("Model '{name}' was dropped")]
    ModelDropped { name: String },

    #[error("Failed to access snapshot file '{path}': {source}")]
    PersistIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode or decode snapshot of model '{model}': {source}")]
    Snapshot {
        model: String,
        #[source]
        source: serde_json::Error,
    },
}
