use crate::TabId;

use serde::Deserialize;

/// Volume change requested by a UI or content context: `{id, volume}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UiRequest {
    /// Target tab, or [`TabId::SENDER`] for the requesting tab itself.
    pub id: TabId,
    /// Requested volume percentage.
    pub volume: f64,
}
