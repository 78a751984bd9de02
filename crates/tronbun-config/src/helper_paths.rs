//! Helper executable discovery.
//!
//! Helpers ship as `webview/build/<name>` next to the host binary (or next
//! to the working directory during development). Inside a macOS app bundle
//! they live under `Contents/Resources`; system installs on Linux may place
//! them under `<prefix>/share/tronbun`.

use std::path::{Path, PathBuf};
use tracing::debug;
use tronbun_common::ConfigError;

use crate::schema::HelpersConfig;

const BUNDLE_MARKER: &str = ".app/Contents/MacOS/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperKind {
    Webview,
    Tray,
}

impl HelperKind {
    /// Human-readable label used in logs and errors.
    pub fn label(self) -> &'static str {
        match self {
            Self::Webview => "WebView",
            Self::Tray => "Tray",
        }
    }

    /// File name of the helper for a target OS (`std::env::consts::OS` values).
    pub fn executable_name(self, os: &str) -> &'static str {
        match (self, os == "windows") {
            (Self::Webview, true) => "webview_main_win.exe",
            (Self::Webview, false) => "webview_main",
            (Self::Tray, true) => "tray_main_win.exe",
            (Self::Tray, false) => "tray_main",
        }
    }

    fn override_path(self, config: &HelpersConfig) -> Option<&Path> {
        match self {
            Self::Webview => config.webview_path.as_deref(),
            Self::Tray => config.tray_path.as_deref(),
        }
    }
}

/// Locate a helper executable for the current platform.
///
/// An explicit override must exist. Otherwise the configured search
/// directories are probed first, then the built-in locations.
pub fn resolve_helper(kind: HelperKind, config: &HelpersConfig) -> Result<PathBuf, ConfigError> {
    let name = kind.executable_name(std::env::consts::OS);

    if let Some(path) = kind.override_path(config) {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(ConfigError::HelperNotFound {
            executable: name.to_string(),
            searched: path.display().to_string(),
        });
    }

    let exe = std::env::current_exe().ok();
    let cwd = std::env::current_dir().ok();
    let mut candidates =
        candidate_paths(name, &config.search_dirs, exe.as_deref(), cwd.as_deref());

    // A tray helper usually sits next to an explicitly configured window helper.
    if kind == HelperKind::Tray {
        if let Some(webview) = config.webview_path.as_deref() {
            candidates.insert(0, sibling_tray_path(webview));
        }
    }
    find_first(name, &candidates)
}

/// Every location probed for `name`, in priority order.
pub fn candidate_paths(
    name: &str,
    search_dirs: &[PathBuf],
    exe: Option<&Path>,
    cwd: Option<&Path>,
) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = search_dirs.iter().map(|dir| dir.join(name)).collect();

    if let Some(exe) = exe {
        let root = executable_root(exe);
        paths.push(root.join("webview").join("build").join(name));
        paths.push(root.join(name));
        if let Some(share) = share_dir(&root) {
            paths.push(share.join("webview").join("build").join(name));
        }
    }
    if let Some(cwd) = cwd {
        paths.push(cwd.join("webview").join("build").join(name));
    }

    let mut seen = std::collections::HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));
    paths
}

/// Directory helpers are resolved against: the executable's directory, or
/// the bundle's `Contents/Resources` for a macOS app.
pub fn executable_root(exe: &Path) -> PathBuf {
    let text = exe.to_string_lossy();
    if let Some((bundle, _)) = text.split_once(BUNDLE_MARKER) {
        return PathBuf::from(format!("{bundle}.app"))
            .join("Contents")
            .join("Resources");
    }
    exe.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn share_dir(root: &Path) -> Option<PathBuf> {
    if root.file_name()? != "bin" {
        return None;
    }
    Some(root.parent()?.join("share").join("tronbun"))
}

fn find_first(name: &str, candidates: &[PathBuf]) -> Result<PathBuf, ConfigError> {
    for path in candidates {
        debug!("probing helper at {}", path.display());
        if path.is_file() {
            return Ok(path.clone());
        }
    }

    let searched = candidates
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    Err(ConfigError::HelperNotFound {
        executable: name.to_string(),
        searched,
    })
}

/// Derive the tray helper path from a window helper path in the same build
/// directory.
pub fn sibling_tray_path(webview_path: &Path) -> PathBuf {
    let text = webview_path.to_string_lossy();
    PathBuf::from(text.replace("webview_main", "tray_main"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn executable_names() {
        assert_eq!(HelperKind::Webview.executable_name("linux"), "webview_main");
        assert_eq!(HelperKind::Webview.executable_name("macos"), "webview_main");
        assert_eq!(
            HelperKind::Webview.executable_name("windows"),
            "webview_main_win.exe"
        );
        assert_eq!(HelperKind::Tray.executable_name("linux"), "tray_main");
        assert_eq!(HelperKind::Tray.executable_name("windows"), "tray_main_win.exe");
    }

    #[test]
    fn bundle_maps_to_resources() {
        let exe = Path::new("/Applications/Demo.app/Contents/MacOS/demo");
        assert_eq!(
            executable_root(exe),
            PathBuf::from("/Applications/Demo.app/Contents/Resources")
        );
    }

    #[test]
    fn plain_executable_uses_parent() {
        assert_eq!(
            executable_root(Path::new("/opt/demo/bin/demo")),
            PathBuf::from("/opt/demo/bin")
        );
    }

    #[test]
    fn candidate_order() {
        let paths = candidate_paths(
            "webview_main",
            &[PathBuf::from("/custom")],
            Some(Path::new("/usr/local/bin/demo")),
            Some(Path::new("/work")),
        );
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/custom/webview_main"),
                PathBuf::from("/usr/local/bin/webview/build/webview_main"),
                PathBuf::from("/usr/local/bin/webview_main"),
                PathBuf::from("/usr/local/share/tronbun/webview/build/webview_main"),
                PathBuf::from("/work/webview/build/webview_main"),
            ]
        );
    }

    #[test]
    fn candidates_are_deduplicated() {
        let paths = candidate_paths(
            "tray_main",
            &[],
            Some(Path::new("/work/demo")),
            Some(Path::new("/work")),
        );
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/work/webview/build/tray_main"),
                PathBuf::from("/work/tray_main"),
            ]
        );
    }

    #[test]
    fn finds_first_existing() {
        let dir = tempfile::tempdir().unwrap();
        let build = dir.path().join("webview").join("build");
        std::fs::create_dir_all(&build).unwrap();
        std::fs::write(build.join("webview_main"), "").unwrap();

        let candidates = candidate_paths("webview_main", &[], None, Some(dir.path()));
        let found = find_first("webview_main", &candidates).unwrap();
        assert_eq!(found, build.join("webview_main"));
    }

    #[test]
    fn missing_lists_searched_paths() {
        let candidates = vec![PathBuf::from("/nope/a"), PathBuf::from("/nope/b")];
        match find_first("webview_main", &candidates) {
            Err(ConfigError::HelperNotFound {
                executable,
                searched,
            }) => {
                assert_eq!(executable, "webview_main");
                assert_eq!(searched, "/nope/a\n/nope/b");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn override_must_exist() {
        let config = HelpersConfig {
            tray_path: Some(PathBuf::from("/definitely/not/here/tray_main")),
            ..Default::default()
        };
        let err = resolve_helper(HelperKind::Tray, &config).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here/tray_main"));
    }

    #[test]
    fn override_is_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my_webview");
        std::fs::write(&path, "").unwrap();

        let config = HelpersConfig {
            webview_path: Some(path.clone()),
            ..Default::default()
        };
        assert_eq!(resolve_helper(HelperKind::Webview, &config).unwrap(), path);
    }

    #[test]
    fn tray_found_next_to_webview_override() {
        let dir = tempfile::tempdir().unwrap();
        let webview = dir.path().join("webview_main");
        let tray = dir.path().join("tray_main");
        std::fs::write(&webview, "").unwrap();
        std::fs::write(&tray, "").unwrap();

        let config = HelpersConfig {
            webview_path: Some(webview),
            ..Default::default()
        };
        if std::env::consts::OS != "windows" {
            assert_eq!(resolve_helper(HelperKind::Tray, &config).unwrap(), tray);
        }
    }

    #[test]
    fn tray_sibling() {
        assert_eq!(
            sibling_tray_path(Path::new("/opt/webview/build/webview_main")),
            PathBuf::from("/opt/webview/build/tray_main")
        );
        assert_eq!(
            sibling_tray_path(Path::new("C:/app/webview_main_win.exe")),
            PathBuf::from("C:/app/tray_main_win.exe")
        );
    }
}
