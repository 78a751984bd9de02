//! Tests for TOML config loading and path resolution.

use super::*;
use std::path::Path;
use tronbun_common::ConfigError;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_tronbun_config.toml"));
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tronbun.toml");
    std::fs::write(
        &path,
        r#"
[bridge]
command_timeout_ms = 8000

[helpers]
webview_path = "/opt/tronbun/webview_main"
search_dirs = ["/opt/a", "/opt/b"]
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.bridge.command_timeout_ms, 8000);
    assert_eq!(
        config.helpers.webview_path.as_deref(),
        Some(Path::new("/opt/tronbun/webview_main"))
    );
    assert_eq!(config.helpers.search_dirs.len(), 2);
    // Defaults preserved
    assert_eq!(config.bridge.tray_step_delay_ms, 50);
    assert!(!config.dev.hot_reload);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tronbun.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let result = load_from_path(&path);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn invalid_values_still_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tronbun.toml");
    std::fs::write(&path, "[bridge]\ncommand_timeout_ms = 0\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.bridge.command_timeout_ms, 0);
}

#[test]
fn wrong_type_is_parse_error() {
    let result = load_from_str("[dev]\nhot_reload = \"yes please\"\n");
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn default_paths_end_with_file_name() {
    let paths = default_config_paths();
    assert!(!paths.is_empty());
    assert!(paths.iter().all(|p| p.ends_with(CONFIG_FILE_NAME)));
}
