use std::time::Duration;

/// Deadline applied to every command unless configured otherwise.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-helper transport settings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Label used in logs, error messages and the stderr relay prefix.
    pub name: String,
    pub command_timeout: Duration,
    /// Copy helper stderr to the host's stderr as `[<name>] <line>`. When
    /// unset the lines go to the debug log instead.
    pub relay_stderr: bool,
}

impl TransportConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            relay_stderr: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TransportConfig::new("WebView");
        assert_eq!(config.name, "WebView");
        assert_eq!(config.command_timeout, Duration::from_millis(5000));
        assert!(config.relay_stderr);
    }

    #[test]
    fn timeout_override() {
        let config = TransportConfig::new("Tray").with_timeout(Duration::from_millis(250));
        assert_eq!(config.command_timeout.as_millis(), 250);
    }
}
