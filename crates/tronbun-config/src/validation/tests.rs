//! Tests for the validation pipeline.

use super::*;
use std::path::PathBuf;

#[test]
fn default_config_validates() {
    assert!(validate(&TronbunConfig::default()).is_ok());
}

#[test]
fn catches_timeout_too_small() {
    let mut config = TronbunConfig::default();
    config.bridge.command_timeout_ms = 10;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("bridge.command_timeout_ms = 10"));
}

#[test]
fn catches_step_delay_too_large() {
    let mut config = TronbunConfig::default();
    config.bridge.tray_step_delay_ms = 60_000;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("bridge.tray_step_delay_ms"));
}

#[test]
fn catches_empty_override_path() {
    let mut config = TronbunConfig::default();
    config.helpers.tray_path = Some(PathBuf::new());
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("helpers.tray_path"));
}

#[test]
fn catches_empty_search_dir() {
    let mut config = TronbunConfig::default();
    config.helpers.search_dirs = vec![PathBuf::from("/opt"), PathBuf::new()];
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("helpers.search_dirs[1]"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = TronbunConfig::default();
    config.bridge.command_timeout_ms = 0;
    config.dev.reload_debounce_ms = 99_999;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("bridge.command_timeout_ms"));
    assert!(err.contains("dev.reload_debounce_ms"));
    assert!(err.contains("; "));
}
