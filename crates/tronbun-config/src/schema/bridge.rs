//! Transport and helper lifecycle settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Deadline for each helper command.
    pub command_timeout_ms: u64,
    /// Log every protocol line at debug level.
    pub debug: bool,
    /// Pause after launching the tray helper before the first command.
    pub tray_startup_delay_ms: u64,
    /// Pause between the tray's initial icon, tooltip and menu commands.
    pub tray_step_delay_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            command_timeout_ms: 5000,
            debug: false,
            tray_startup_delay_ms: 100,
            tray_step_delay_ms: 50,
        }
    }
}

impl BridgeConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn tray_startup_delay(&self) -> Duration {
        Duration::from_millis(self.tray_startup_delay_ms)
    }

    pub fn tray_step_delay(&self) -> Duration {
        Duration::from_millis(self.tray_step_delay_ms)
    }
}
