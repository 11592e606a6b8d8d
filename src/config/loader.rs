use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::{StoreConfig, MAX_EVENT_CAPACITY};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl StoreConfig {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/model-store/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("model-store").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// - If the file doesn't exist, returns `StoreConfig::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(StoreConfig::default());
        }

        Self::load_from(&path)
    }

    /// Loads and validates configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: StoreConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: StoreConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError {
                path: PathBuf::from("<inline>"),
                source: e,
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The event channel has room for at least one event and at most
    ///   `MAX_EVENT_CAPACITY`
    /// - Persistence, when enabled, points at a file
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.event_capacity == 0 {
            return Err(ConfigError::ValidationError {
                message: "store.event_capacity must be greater than zero".to_string(),
            });
        }

        if self.store.event_capacity > MAX_EVENT_CAPACITY {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "store.event_capacity must be at most {}, got {}",
                    MAX_EVENT_CAPACITY, self.store.event_capacity
                ),
            });
        }

        if self.persist.enabled && self.persist.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "persist.path must be set when persistence is enabled".to_string(),
            });
        }

        Ok(())
    }
}
