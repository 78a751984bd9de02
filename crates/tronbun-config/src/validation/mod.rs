//! Configuration validation.
//!
//! Checks numeric ranges and helper overrides, collecting every problem
//! into a single `ConfigError`.

mod helpers;

#[cfg(test)]
mod tests;

use crate::schema::TronbunConfig;
use helpers::{validate_optional_path, validate_range};
use tronbun_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &TronbunConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_range(
        &mut errors,
        "bridge.command_timeout_ms",
        config.bridge.command_timeout_ms,
        100,
        600_000,
    );
    validate_range(
        &mut errors,
        "bridge.tray_startup_delay_ms",
        config.bridge.tray_startup_delay_ms,
        0,
        10_000,
    );
    validate_range(
        &mut errors,
        "bridge.tray_step_delay_ms",
        config.bridge.tray_step_delay_ms,
        0,
        10_000,
    );
    validate_range(
        &mut errors,
        "dev.reload_debounce_ms",
        config.dev.reload_debounce_ms,
        0,
        10_000,
    );

    validate_optional_path(&mut errors, "helpers.webview_path", &config.helpers.webview_path);
    validate_optional_path(&mut errors, "helpers.tray_path", &config.helpers.tray_path);
    for (i, dir) in config.helpers.search_dirs.iter().enumerate() {
        if dir.as_os_str().is_empty() {
            errors.push(format!("helpers.search_dirs[{i}] is empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
