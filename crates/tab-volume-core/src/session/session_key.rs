use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque capture stream id, stable for a tab's capture lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Wrap a stream id issued by the browser.
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self(stream_id.into())
    }

    /// The raw stream id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
