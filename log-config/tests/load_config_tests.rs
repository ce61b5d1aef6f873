//! File-based loading behaviour of the logging config.

use log_config::{
    load_logging_config_from, try_load_logging_config, ConfigError, ConfigPaths, LogFormat,
    LoggingConfig, Rotation, Severity,
};
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.yaml");
    fs::write(&path, contents).unwrap();
    path
}

// =============================================================================
// DEFAULTS
// =============================================================================

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");

    assert!(try_load_logging_config(&path).unwrap().is_none());

    let config = load_logging_config_from(&path);
    assert_eq!(config, LoggingConfig::default());
    assert_eq!(config.level, Severity::Info);
    assert_eq!(config.log_format, LogFormat::Standard);
    assert_eq!(config.rotation, Rotation::Size(5_000_000));
    assert_eq!(config.retention, 5);
    assert!(config.to_console);
}

#[test]
fn test_empty_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    assert_eq!(load_logging_config_from(&path), LoggingConfig::default());
}

#[test]
fn test_file_without_logging_key_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "database:\n  url: postgres://localhost\n");

    assert_eq!(load_logging_config_from(&path), LoggingConfig::default());
}

// =============================================================================
// PARTIAL CONFIGURATION
// =============================================================================

#[test]
fn test_single_level_key_keeps_other_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "logging:\n  level: DEBUG\n");

    let config = load_logging_config_from(&path);
    assert_eq!(
        config,
        LoggingConfig {
            level: Severity::Debug,
            ..LoggingConfig::default()
        }
    );
}

#[test]
fn test_flow_mapping_is_accepted() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "logging: {level: WARNING, to_console: false}\n");

    let config = load_logging_config_from(&path);
    assert_eq!(config.level, Severity::Warning);
    assert!(!config.to_console);
    assert_eq!(config.retention, 5);
}

// =============================================================================
// RECOVERED ERRORS
// =============================================================================

#[test]
fn test_malformed_yaml_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "logging:\n  level: [DEBUG\n  retention: 3\n");

    let err = try_load_logging_config(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));

    assert_eq!(load_logging_config_from(&path), LoggingConfig::default());
}

#[test]
fn test_unreadable_path_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();

    // A directory where the file is expected cannot be read as text.
    let err = try_load_logging_config(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));

    assert_eq!(load_logging_config_from(dir.path()), LoggingConfig::default());
}

#[test]
fn test_paths_point_at_config_in_root() {
    let dir = TempDir::new().unwrap();
    write_config(&dir, "logging:\n  log_format: enhanced\n");

    let paths = ConfigPaths::new(dir.path());
    let config = load_logging_config_from(&paths.config_file);
    assert_eq!(config.log_format, LogFormat::Enhanced);
}
