use model_store::config::{ConfigError, StoreConfig};
use std::path::PathBuf;
use tempfile::TempDir;

/// Test that StoreConfig::config_path() ends with the expected filename.
#[test]
fn test_config_path_ends_with_expected() {
    let path = StoreConfig::config_path();
    assert!(path.ends_with("model-store/config.toml"));
}

/// Test that every section is optional.
#[test]
fn test_partial_file_fills_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[persist]
enabled = true
path = "/tmp/model-store-test/state.json"
flush_on_commit = true

[logging]
filter = "model_store=debug"
"#,
    )
    .unwrap();

    let config = StoreConfig::load_from(&path).unwrap();
    assert_eq!(config.store.event_capacity, 256);
    assert!(config.persist.enabled);
    assert!(config.persist.flush_on_commit);
    assert_eq!(
        config.persist.path,
        PathBuf::from("/tmp/model-store-test/state.json")
    );
    assert_eq!(config.logging.filter, "model_store=debug");
    assert!(config.logging.file.is_none());
}

/// Test that a missing explicit file is a read error.
#[test]
fn test_missing_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let err = StoreConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError { .. }));
}

/// Test that invalid TOML is reported with its path.
#[test]
fn test_parse_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "store = [").unwrap();

    let err = StoreConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert!(err.to_string().contains("broken.toml"));
}

/// Test that validation runs on file loads too.
#[test]
fn test_validation_runs_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[store]\nevent_capacity = 0\n").unwrap();

    let err = StoreConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
}

/// Test that the config round-trips through TOML.
#[test]
fn test_default_serializes_and_loads_back() {
    let text = toml::to_string(&StoreConfig::default()).unwrap();
    let config = StoreConfig::from_toml_str(&text).unwrap();
    assert_eq!(config, StoreConfig::default());
}
