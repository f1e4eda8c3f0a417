use tab_volume_core::{TabChange, TabId, TabInfo};

use serde::Deserialize;

/// Inbound message from the browser side, tagged by `event`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// Full tab snapshot, in browser order.
    Tabs {
        /// Every open tab.
        tabs: Vec<TabInfo>,
    },
    /// A tab's metadata changed.
    TabUpdated {
        /// The tab after the change.
        tab: TabInfo,
        /// Which fields changed.
        #[serde(default)]
        change: TabChange,
    },
    /// A tab was closed.
    TabRemoved {
        /// Closed tab.
        id: TabId,
    },
    /// The UI moved a volume slider.
    SetVolume {
        /// Echoed back on the matching `volume_result`.
        request_id: u64,
        /// Target tab, or -1 for the sender's own tab.
        id: TabId,
        /// Requested percentage.
        volume: f64,
        /// Tab the request came from, if any.
        #[serde(default)]
        sender_tab: Option<TabId>,
    },
    /// The UI opened and wants the tab's stored volume.
    GetPreferred {
        /// Echoed back on the matching `preferred`.
        request_id: u64,
        /// Tab whose domain to look up.
        id: TabId,
    },
    /// The browser side is going away.
    Shutdown,
}
