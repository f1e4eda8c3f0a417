use crate::CoreResult;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Browser tab identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl TabId {
    /// Sentinel used by UI and content contexts to mean "the sender's own tab".
    pub const SENDER: TabId = TabId(-1);

    /// Whether this id is the sender sentinel rather than a real tab.
    pub fn is_sender(self) -> bool {
        self == Self::SENDER
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of a tab's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    /// Tab identifier.
    pub id: TabId,
    /// Current document title.
    #[serde(default)]
    pub title: String,
    /// Current URL; may be empty for tabs the browser hides it on.
    #[serde(default)]
    pub url: String,
}

impl TabInfo {
    /// Case-insensitive check of the title against a set of substring filters.
    ///
    /// Empty filters never match, so a stray `""` cannot address every tab.
    pub fn title_matches<S: AsRef<str>>(&self, filters: &[S]) -> bool {
        let title = self.title.to_lowercase();
        filters.iter().any(|filter| {
            let filter = filter.as_ref().trim();
            !filter.is_empty() && title.contains(&filter.to_lowercase())
        })
    }
}

/// Which tab metadata changed in an update notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TabChange {
    /// New URL, when it changed.
    #[serde(default)]
    pub url: Option<String>,
    /// New title, when it changed.
    #[serde(default)]
    pub title: Option<String>,
}

impl TabChange {
    /// Only URL and title changes are relevant to the host-facing tab listing.
    pub fn affects_listing(&self) -> bool {
        self.url.is_some() || self.title.is_some()
    }
}

/// Read access to the browser's open tabs.
#[async_trait]
pub trait Tabs: Send + Sync {
    /// All open tabs, in browser order.
    async fn query(&self) -> CoreResult<Vec<TabInfo>>;

    /// A single tab by id.
    async fn get(&self, tab_id: TabId) -> CoreResult<TabInfo>;
}
