//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod bridge;
mod dev;
mod helpers;

pub use bridge::*;
pub use dev::*;
pub use helpers::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TronbunConfig {
    pub bridge: BridgeConfig,
    pub helpers: HelpersConfig,
    pub dev: DevConfig,
}
