use std::path::{Path, PathBuf};

pub const SIGNAL_FILE_NAME: &str = ".dev-reload";

/// Signal file watched for a page at `asset_path`.
pub fn signal_file_for(asset_path: &Path) -> PathBuf {
    asset_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(SIGNAL_FILE_NAME)
}

/// Filesystem path of a `file://` URL, or `None` for any other scheme.
pub fn file_url_path(url: &str) -> Option<PathBuf> {
    let path = url.strip_prefix("file://")?;
    let path = path.split(['?', '#']).next().unwrap_or(path);
    Some(PathBuf::from(path))
}

/// Leading integer of the signal file, if readable.
pub fn read_timestamp(path: &Path) -> Option<u64> {
    let content = std::fs::read_to_string(path).ok()?;
    let digits: String = content
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Last reload timestamp seen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSignal {
    last: u64,
}

impl ReloadSignal {
    pub fn new(initial: u64) -> Self {
        Self { last: initial }
    }

    /// Seed from the signal file's current contents.
    pub fn from_file(path: &Path) -> Self {
        Self::new(read_timestamp(path).unwrap_or(0))
    }

    pub fn last(&self) -> u64 {
        self.last
    }

    /// Record `stamp`; true when it is newer than anything seen so far.
    pub fn advance(&mut self, stamp: u64) -> bool {
        if stamp > self.last {
            self.last = stamp;
            true
        } else {
            false
        }
    }
}
