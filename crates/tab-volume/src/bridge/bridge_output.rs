use tab_volume_core::{ConnectionIcon, SessionKey, TabId, Volume};

use serde::Serialize;

/// Icon state as shown to the browser side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconState {
    /// Red icon.
    Disconnected,
    /// Blue icon.
    Connected,
}

impl From<ConnectionIcon> for IconState {
    fn from(icon: ConnectionIcon) -> Self {
        match icon {
            ConnectionIcon::Disconnected => Self::Disconnected,
            ConnectionIcon::Connected => Self::Connected,
        }
    }
}

/// Outbound message to the browser side, tagged by `event`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BridgeOutput {
    /// Switch the extension icon.
    Icon {
        /// New icon.
        state: IconState,
    },
    /// Set a tab's badge text.
    Badge {
        /// Tab to badge.
        id: TabId,
        /// Text; empty clears the badge.
        text: String,
    },
    /// Play a capture stream at a gain.
    Gain {
        /// Captured tab.
        id: TabId,
        /// Capture stream.
        stream_id: SessionKey,
        /// Linear gain factor.
        gain: f32,
    },
    /// Stop playing a capture stream.
    CaptureStopped {
        /// Captured tab.
        id: TabId,
        /// Capture stream.
        stream_id: SessionKey,
    },
    /// Outcome of a `set_volume` event.
    VolumeResult {
        /// Request being answered.
        request_id: u64,
        /// Whether the volume was applied.
        ok: bool,
    },
    /// Answer to a `get_preferred` event.
    Preferred {
        /// Request being answered.
        request_id: u64,
        /// Stored volume for the tab's domain.
        volume: Volume,
    },
}
