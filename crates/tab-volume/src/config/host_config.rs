use crate::config::{
    default_broadcast_tabs, default_host_name, default_initial_backoff_ms, default_max_backoff_ms,
};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Native companion process configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Registered native host name.
    #[serde(default = "default_host_name")]
    pub name: String,

    /// Host executable. Without one every connect attempt fails and backs off.
    #[serde(default)]
    pub command: Option<PathBuf>,

    /// Extra arguments passed to the host executable.
    #[serde(default)]
    pub args: Vec<String>,

    /// First reconnect delay in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Reconnect delay ceiling in milliseconds.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Send the open-tab listing to the host once it is ready.
    #[serde(default = "default_broadcast_tabs")]
    pub broadcast_tabs: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            name: default_host_name(),
            command: None,
            args: Vec::new(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            broadcast_tabs: default_broadcast_tabs(),
        }
    }
}
