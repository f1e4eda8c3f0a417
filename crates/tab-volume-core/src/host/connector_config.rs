use std::time::Duration;

/// Registered name of the native companion process.
pub const DEFAULT_HOST_NAME: &str = "com.volume.control";

/// First reconnect delay, and the delay after any successful connection.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(1000);

/// Reconnect delay ceiling.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_millis(60_000);

/// Native host connector settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorConfig {
    /// Native host to connect to.
    pub host_name: String,
    /// First reconnect delay.
    pub initial_backoff: Duration,
    /// Reconnect delay ceiling.
    pub max_backoff: Duration,
    /// Send the open-tab listing to the host once it is ready.
    pub broadcast_tabs: bool,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            host_name: DEFAULT_HOST_NAME.to_string(),
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            broadcast_tabs: false,
        }
    }
}
