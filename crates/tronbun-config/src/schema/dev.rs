//! Development mode settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevConfig {
    /// Reload `file://` pages when the `.dev-reload` signal advances.
    pub hot_reload: bool,
    pub reload_debounce_ms: u64,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            hot_reload: false,
            reload_debounce_ms: 500,
        }
    }
}

impl DevConfig {
    pub fn reload_debounce(&self) -> Duration {
        Duration::from_millis(self.reload_debounce_ms)
    }
}
