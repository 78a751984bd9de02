//! Tronbun configuration.
//!
//! TOML-based settings for the helper bridge, environment overrides,
//! helper executable discovery, and the dev-mode reload signal watcher.
//! Every section has defaults, so a missing or partial `tronbun.toml` works.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tronbun_config::load_config;
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("{}ms", config.bridge.command_timeout_ms);
//! ```

pub mod env;
pub mod helper_paths;
pub mod reload;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use helper_paths::{resolve_helper, HelperKind};
pub use reload::DevReloadWatcher;
pub use schema::{BridgeConfig, DevConfig, HelpersConfig, TronbunConfig};

use std::path::Path;
use tronbun_common::ConfigError;

/// Load, apply environment overrides, and validate.
///
/// Reads `path` when given, otherwise the default locations.
pub fn load_config(path: Option<&Path>) -> Result<TronbunConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    env::apply_env_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}
