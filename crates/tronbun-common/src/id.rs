use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlation id for an outbound command: millisecond timestamp followed by
/// a random hex suffix. Only needs to be unique among in-flight commands.
pub fn new_command_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let uuid = uuid::Uuid::new_v4();
    let suffix: String = uuid.simple().to_string().chars().take(10).collect();
    format!("{millis}{suffix}")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowId(String);

impl WindowId {
    pub fn new() -> Self {
        Self(new_command_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WindowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
