use std::fs;
use std::path::Path;
use std::time::Duration;

use tempfile::tempdir;

use crate::config::{load_file, BootstrapConfig, ConfigError, ConfigFormat};

#[test]
fn test_defaults() {
    let config = BootstrapConfig::default();
    assert_eq!(config.batch_cap, 5);
    assert_eq!(config.timeout(), Duration::from_secs(10));
    assert_eq!(config.frame_interval(), Duration::from_millis(16));
    assert!(!config.reject_cycles);
    assert!(config.validate().is_ok());
}

#[test]
fn test_builders() {
    let config = BootstrapConfig::default()
        .with_batch_cap(2)
        .with_timeout(Duration::from_millis(250))
        .with_frame_ms(33)
        .with_cycle_check(true);
    assert_eq!(config.batch_cap, 2);
    assert_eq!(config.timeout_ms, 250);
    assert_eq!(config.frame_ms, 33);
    assert!(config.reject_cycles);
}

#[test]
fn test_validate_rejects_zero_values() {
    for (config, key) in [
        (BootstrapConfig::default().with_batch_cap(0), "batch_cap"),
        (BootstrapConfig::default().with_timeout(Duration::ZERO), "timeout_ms"),
        (BootstrapConfig::default().with_frame_ms(0), "frame_ms"),
    ] {
        match config.validate() {
            Err(ConfigError::InvalidValue { key: bad, .. }) => assert_eq!(bad, key),
            other => panic!("expected invalid {}, got {:?}", key, other),
        }
    }
}

#[test]
fn test_format_from_extension() {
    assert_eq!(ConfigFormat::from_path(Path::new("a/b.json")), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("b.JSON")), Some(ConfigFormat::Json));
    assert_eq!(ConfigFormat::from_path(Path::new("b.ini")), None);
    assert_eq!(ConfigFormat::from_path(Path::new("noext")), None);
    assert_eq!(ConfigFormat::Json.name(), "JSON");
}

#[test]
fn test_load_json_with_partial_fields() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("ignite.json");
    fs::write(&path, r#"{ "batch_cap": 3, "timeout_ms": 2500 }"#).unwrap();

    let config = BootstrapConfig::load(&path).unwrap();
    assert_eq!(config.batch_cap, 3);
    assert_eq!(config.timeout_ms, 2500);
    assert_eq!(config.frame_ms, 16);
}

#[cfg(feature = "toml-config")]
#[test]
fn test_load_toml() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("ignite.toml");
    fs::write(&path, "batch_cap = 1\nreject_cycles = true\n").unwrap();

    let config = BootstrapConfig::load(&path).unwrap();
    assert_eq!(config.batch_cap, 1);
    assert!(config.reject_cycles);
    assert_eq!(ConfigFormat::from_path(&path), Some(ConfigFormat::Toml));
}

#[cfg(feature = "yaml-config")]
#[test]
fn test_load_yaml() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("ignite.yml");
    fs::write(&path, "frame_ms: 8\ntimeout_ms: 500\n").unwrap();

    let config = BootstrapConfig::load(&path).unwrap();
    assert_eq!(config.frame_ms, 8);
    assert_eq!(config.timeout_ms, 500);
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("ignite.json");
    fs::write(&path, r#"{ "batch_cap": 0 }"#).unwrap();

    assert!(matches!(
        BootstrapConfig::load(&path),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn test_load_errors() {
    let dir = tempdir().expect("Failed to create temp directory");

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        load_file::<BootstrapConfig>(&missing),
        Err(ConfigError::Io { .. })
    ));

    let unknown = dir.path().join("ignite.ini");
    fs::write(&unknown, "batch_cap=1").unwrap();
    assert!(matches!(
        load_file::<BootstrapConfig>(&unknown),
        Err(ConfigError::UnsupportedFormat { .. })
    ));

    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").unwrap();
    match load_file::<BootstrapConfig>(&broken) {
        Err(ConfigError::Parse { format, .. }) => assert_eq!(format, "JSON"),
        other => panic!("expected a parse error, got {:?}", other),
    }
}
