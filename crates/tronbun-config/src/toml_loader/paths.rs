//! Config path resolution.

use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "tronbun.toml";

/// Candidate config files in lookup order: working directory first, then the
/// platform config directory.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(CONFIG_FILE_NAME));
    }
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("tronbun").join(CONFIG_FILE_NAME));
    }
    paths
}
