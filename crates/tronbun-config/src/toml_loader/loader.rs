//! Core TOML config loading: read from a path or the default locations.

use crate::schema::TronbunConfig;
use crate::validation;
use std::path::Path;
use tracing::{info, warn};
use tronbun_common::ConfigError;

use super::paths::default_config_paths;

/// Parse config text, filling missing fields with defaults.
pub fn load_from_str(content: &str) -> Result<TronbunConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))
}

/// Load config from a specific TOML file path.
///
/// Validation problems are logged and the parsed config is returned as-is;
/// callers that need a hard failure run [`validation::validate`] themselves.
pub fn load_from_path(path: &Path) -> Result<TronbunConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;
    let config = load_from_str(&content)?;

    if let Err(e) = validation::validate(&config) {
        warn!("config validation warning in {}: {e}", path.display());
    }

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load the first config found in the default locations, or defaults when
/// none exists.
///
/// Looks for `tronbun.toml` in the working directory, then in the platform
/// config directory (`~/.config/tronbun/` on Linux).
pub fn load_default() -> Result<TronbunConfig, ConfigError> {
    for path in default_config_paths() {
        match load_from_path(&path) {
            Ok(config) => return Ok(config),
            Err(ConfigError::FileNotFound(_)) => continue,
            Err(e) => return Err(e),
        }
    }

    info!("no config file found, using defaults");
    Ok(TronbunConfig::default())
}
