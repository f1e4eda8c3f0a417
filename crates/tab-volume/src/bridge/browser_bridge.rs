use crate::bridge::{BridgeOutput, BridgeTrack, IconState};

use tab_volume_core::{
    ConnectionIcon, CoreResult, Indicator, SessionKey, TabCapture, TabId, TabInfo, Tabs,
    VolumeError,
    capture::{MediaDevices, MediaTrack},
};

use std::{
    collections::HashMap,
    panic::Location,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Default)]
struct BridgeState {
    /// Open tabs in browser order.
    tabs: Vec<TabInfo>,
    /// Which tab each issued capture stream id belongs to.
    streams: HashMap<SessionKey, TabId>,
}

/// Browser-side collaborators backed by the stdio bridge.
///
/// Tab metadata is whatever the browser side last reported. Capture stream
/// ids are minted locally and resolved back to their tab when audio is
/// opened.
pub struct BrowserBridge {
    state: Mutex<BridgeState>,
    output: mpsc::UnboundedSender<BridgeOutput>,
}

impl BrowserBridge {
    /// Bridge that writes its output to `output`.
    pub fn new(output: mpsc::UnboundedSender<BridgeOutput>) -> Self {
        Self {
            state: Mutex::new(BridgeState::default()),
            output,
        }
    }

    /// Replace the tab snapshot.
    pub fn replace_tabs(&self, tabs: Vec<TabInfo>) {
        let count = tabs.len();
        self.lock().tabs = tabs;
        debug!(count, "Tab snapshot replaced");
    }

    /// Insert or update one tab, keeping its position if already known.
    pub fn upsert_tab(&self, tab: TabInfo) {
        let mut state = self.lock();
        match state.tabs.iter_mut().find(|known| known.id == tab.id) {
            Some(known) => *known = tab,
            None => state.tabs.push(tab),
        }
    }

    /// Forget a closed tab and every stream id issued for it.
    pub fn remove_tab(&self, tab_id: TabId) {
        let mut state = self.lock();
        state.tabs.retain(|tab| tab.id != tab_id);
        state.streams.retain(|_, owner| *owner != tab_id);
    }

    fn lock(&self) -> MutexGuard<'_, BridgeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[track_caller]
    fn send(&self, message: BridgeOutput) -> CoreResult<()> {
        self.output.send(message).map_err(|_| VolumeError::Transport {
            reason: "Browser bridge is closed".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

#[async_trait]
impl Tabs for BrowserBridge {
    async fn query(&self) -> CoreResult<Vec<TabInfo>> {
        Ok(self.lock().tabs.clone())
    }

    async fn get(&self, tab_id: TabId) -> CoreResult<TabInfo> {
        self.lock()
            .tabs
            .iter()
            .find(|tab| tab.id == tab_id)
            .cloned()
            .ok_or_else(|| VolumeError::TabNotFound {
                tab_id,
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

#[async_trait]
impl TabCapture for BrowserBridge {
    async fn media_stream_id(&self, tab_id: TabId) -> CoreResult<SessionKey> {
        let mut state = self.lock();

        if !state.tabs.iter().any(|tab| tab.id == tab_id) {
            return Err(VolumeError::CaptureUnavailable {
                tab_id,
                reason: "Tab is not open".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let stream_id = SessionKey::new(Uuid::new_v4().to_string());
        state.streams.insert(stream_id.clone(), tab_id);

        info!(tab_id = %tab_id, session = %stream_id, "Capture stream id issued");

        Ok(stream_id)
    }
}

#[async_trait]
impl MediaDevices for BrowserBridge {
    async fn open_tab_audio(&self, stream_id: &SessionKey) -> CoreResult<Box<dyn MediaTrack>> {
        let tab_id = self.lock().streams.get(stream_id).copied().ok_or_else(|| {
            VolumeError::BackendFailed {
                reason: format!("Unknown capture stream {}", stream_id),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        Ok(Box::new(BridgeTrack::new(
            tab_id,
            stream_id.clone(),
            self.output.clone(),
        )))
    }
}

impl Indicator for BrowserBridge {
    fn set_connection_state(&self, icon: ConnectionIcon) -> CoreResult<()> {
        self.send(BridgeOutput::Icon {
            state: IconState::from(icon),
        })
    }

    fn set_tab_badge(&self, tab_id: TabId, text: &str) -> CoreResult<()> {
        self.send(BridgeOutput::Badge {
            id: tab_id,
            text: text.to_string(),
        })
    }
}
