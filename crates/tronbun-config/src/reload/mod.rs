//! Dev-mode hot reload signal.
//!
//! The dev tooling writes a millisecond timestamp to `.dev-reload` next to
//! the served page whenever assets are rebuilt. A window showing that page
//! reloads each time the timestamp advances.

mod signal;
mod watcher;

#[cfg(test)]
mod tests;

pub use signal::{file_url_path, read_timestamp, signal_file_for, ReloadSignal, SIGNAL_FILE_NAME};
pub use watcher::DevReloadWatcher;
