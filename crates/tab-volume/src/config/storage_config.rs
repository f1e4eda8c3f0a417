use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Preference storage configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Per-domain volume file (None = `preferences.json` in the data directory).
    #[serde(default)]
    pub preferences_path: Option<PathBuf>,
}
