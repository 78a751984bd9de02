//! TOML config file loading.

mod loader;
mod paths;

#[cfg(test)]
mod tests;

pub use loader::{load_default, load_from_path, load_from_str};
pub use paths::{default_config_paths, CONFIG_FILE_NAME};
