use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("config watch error: {0}")]
    WatchError(String),

    #[error("helper executable '{executable}' not found. Searched paths:\n{searched}")]
    HelperNotFound { executable: String, searched: String },
}

/// Failures surfaced by a helper transport.
///
/// Every command settles with exactly one of these or with a result value.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The helper executable could not be started.
    #[error("failed to spawn {helper} helper at {}: {source}", path.display())]
    SpawnFailure {
        helper: String,
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    /// No response arrived within the command deadline.
    #[error("command '{method}' timed out after {timeout_ms}ms")]
    CommandTimeout { method: String, timeout_ms: u64 },

    /// The helper answered the command with an error string.
    #[error("{message}")]
    CommandError { method: String, message: String },

    /// The command was still pending when the helper went away.
    #[error("{helper} process destroyed")]
    ProcessDestroyed { helper: String },

    /// The command was issued after the transport tore down.
    #[error("{helper} process is destroyed")]
    TransportDestroyed { helper: String },

    #[error("failed to encode command '{method}': {message}")]
    Encode { method: String, message: String },
}

impl TransportError {
    /// True for the two teardown variants.
    pub fn is_destroyed(&self) -> bool {
        matches!(
            self,
            Self::ProcessDestroyed { .. } | Self::TransportDestroyed { .. }
        )
    }
}

/// Error returned by a host handler invoked from remote content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(e: serde_json::Error) -> Self {
        Self(format!("invalid payload: {e}"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TronbunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A window or handler name that cannot be used as a script identifier.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("{0}")]
    Other(String),
}
