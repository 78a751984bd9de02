//! Environment variable overrides.

use std::path::PathBuf;
use tracing::debug;

use crate::schema::TronbunConfig;

/// Enables protocol-level debug logging.
pub const ENV_DEBUG: &str = "TRONBUN_DEBUG";
/// Enables hot reload of `file://` content.
pub const ENV_DEV_MODE: &str = "TRONBUN_DEV_MODE";
pub const ENV_WEBVIEW_PATH: &str = "TRONBUN_WEBVIEW_PATH";
pub const ENV_TRAY_PATH: &str = "TRONBUN_TRAY_PATH";

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut TronbunConfig) {
    apply_overrides_with(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary lookup.
pub fn apply_overrides_with<F>(config: &mut TronbunConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(ENV_DEBUG) {
        config.bridge.debug = is_enabled(&value);
        debug!("{ENV_DEBUG} override: {}", config.bridge.debug);
    }
    if let Some(value) = lookup(ENV_DEV_MODE) {
        config.dev.hot_reload = is_enabled(&value);
        debug!("{ENV_DEV_MODE} override: {}", config.dev.hot_reload);
    }
    if let Some(path) = lookup(ENV_WEBVIEW_PATH).filter(|p| !p.is_empty()) {
        config.helpers.webview_path = Some(PathBuf::from(path));
    }
    if let Some(path) = lookup(ENV_TRAY_PATH).filter(|p| !p.is_empty()) {
        config.helpers.tray_path = Some(PathBuf::from(path));
    }
}

/// Any non-empty value other than `0`/`false`/`off`.
pub fn is_enabled(value: &str) -> bool {
    let value = value.trim();
    !(value.is_empty()
        || value == "0"
        || value.eq_ignore_ascii_case("false")
        || value.eq_ignore_ascii_case("off"))
}
