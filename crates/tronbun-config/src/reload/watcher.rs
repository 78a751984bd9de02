//! Filesystem watcher for the reload signal file.

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tronbun_common::ConfigError;

use super::signal::{read_timestamp, signal_file_for, ReloadSignal};

/// Watches a `.dev-reload` file and reports each advanced timestamp.
pub struct DevReloadWatcher {
    signal_file: PathBuf,
    debounce: Duration,
}

impl DevReloadWatcher {
    pub fn new(signal_file: PathBuf, debounce: Duration) -> Self {
        Self {
            signal_file,
            debounce,
        }
    }

    /// Watcher for the signal file that belongs to the page at `asset_path`.
    pub fn for_asset(asset_path: &Path, debounce: Duration) -> Self {
        Self::new(signal_file_for(asset_path), debounce)
    }

    pub fn signal_file(&self) -> &Path {
        &self.signal_file
    }

    /// Send every timestamp newer than the one present at start.
    ///
    /// Runs until `tx` is closed. Bursts of filesystem events are coalesced
    /// within the debounce window before the file is read.
    pub async fn watch(&self, tx: mpsc::Sender<u64>) -> Result<(), ConfigError> {
        let watch_dir = self
            .signal_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = self
            .signal_file
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();

        let mut signal = ReloadSignal::from_file(&self.signal_file);
        info!(
            "watching {} for reload signals (last = {})",
            self.signal_file.display(),
            signal.last()
        );

        // Bridge the sync notify callback into async
        let (notify_tx, mut notify_rx) = mpsc::channel::<()>(16);

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| match result {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        return;
                    }
                    let is_signal = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n == file_name).unwrap_or(false));
                    if is_signal {
                        let _ = notify_tx.try_send(());
                    }
                }
                Err(e) => error!("reload watcher error: {e}"),
            },
            notify::Config::default(),
        )
        .map_err(|e| ConfigError::WatchError(format!("failed to create watcher: {e}")))?;

        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|e| {
                ConfigError::WatchError(format!("failed to watch {}: {e}", watch_dir.display()))
            })?;

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                msg = notify_rx.recv() => if msg.is_none() { break },
            }

            let debounce = tokio::time::sleep(self.debounce);
            tokio::pin!(debounce);
            loop {
                tokio::select! {
                    _ = &mut debounce => break,
                    msg = notify_rx.recv() => if msg.is_none() { return Ok(()) },
                }
            }

            let Some(stamp) = read_timestamp(&self.signal_file) else {
                debug!("reload signal unreadable, ignoring");
                continue;
            };
            if signal.advance(stamp) {
                info!("reload signal advanced to {stamp}");
                if tx.send(stamp).await.is_err() {
                    break;
                }
            }
        }

        drop(watcher);
        Ok(())
    }
}
