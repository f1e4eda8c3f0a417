use crate::config::default_log_filter;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Logging configuration.
///
/// `RUST_LOG` overrides `filter` when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives.
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Write daily rolling log files here instead of stderr.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            directory: None,
            json: false,
        }
    }
}
