//! Tests for the reload signal and its watcher.

use super::*;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

#[test]
fn signal_file_sits_next_to_asset() {
    assert_eq!(
        signal_file_for(Path::new("/app/dist/web/index.html")),
        PathBuf::from("/app/dist/web/.dev-reload")
    );
}

#[test]
fn file_url_paths() {
    assert_eq!(
        file_url_path("file:///app/dist/index.html"),
        Some(PathBuf::from("/app/dist/index.html"))
    );
    assert_eq!(
        file_url_path("file:///app/index.html?x=1#top"),
        Some(PathBuf::from("/app/index.html"))
    );
    assert_eq!(file_url_path("https://example.com"), None);
}

#[test]
fn reads_leading_integer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SIGNAL_FILE_NAME);

    assert_eq!(read_timestamp(&path), None);
    std::fs::write(&path, "1700000000123\n").unwrap();
    assert_eq!(read_timestamp(&path), Some(1_700_000_000_123));
    std::fs::write(&path, "42abc").unwrap();
    assert_eq!(read_timestamp(&path), Some(42));
    std::fs::write(&path, "garbage").unwrap();
    assert_eq!(read_timestamp(&path), None);
}

#[test]
fn signal_only_moves_forward() {
    let mut signal = ReloadSignal::new(100);
    assert!(!signal.advance(100));
    assert!(!signal.advance(50));
    assert!(signal.advance(101));
    assert_eq!(signal.last(), 101);
}

#[test]
fn signal_seeded_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(SIGNAL_FILE_NAME);
    assert_eq!(ReloadSignal::from_file(&path).last(), 0);

    std::fs::write(&path, "77").unwrap();
    assert_eq!(ReloadSignal::from_file(&path).last(), 77);
}

#[test]
fn watcher_for_asset() {
    let watcher =
        DevReloadWatcher::for_asset(Path::new("/tmp/site/index.html"), Duration::from_millis(10));
    assert_eq!(watcher.signal_file(), Path::new("/tmp/site/.dev-reload"));
}

#[tokio::test]
async fn watcher_reports_advanced_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let signal = dir.path().join(SIGNAL_FILE_NAME);
    std::fs::write(&signal, "100").unwrap();

    let watcher = DevReloadWatcher::new(signal.clone(), Duration::from_millis(50));
    let (tx, mut rx) = mpsc::channel(4);
    let task = tokio::spawn(async move { watcher.watch(tx).await });

    // Give the watcher time to register before touching the file.
    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::write(&signal, "50").unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    std::fs::write(&signal, "200").unwrap();

    let stamp = tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("no reload signal")
        .unwrap();
    assert_eq!(stamp, 200);

    drop(rx);
    std::fs::write(&signal, "300").unwrap();
    let result = tokio::time::timeout(Duration::from_secs(10), task)
        .await
        .expect("watcher did not stop");
    assert!(result.unwrap().is_ok());
}
