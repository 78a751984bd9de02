//! Helper executable locations.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpersConfig {
    /// Explicit window helper path. Skips the search when set.
    pub webview_path: Option<PathBuf>,
    /// Explicit tray helper path. Skips the search when set.
    pub tray_path: Option<PathBuf>,
    /// Extra directories probed before the built-in locations.
    pub search_dirs: Vec<PathBuf>,
}
