use crate::bridge::BridgeOutput;

use tab_volume_core::{
    CoreResult, SessionKey, TabId, VolumeError,
    capture::{GainNode, MediaTrack},
};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::debug;

/// A tab's capture stream as played by the browser side.
///
/// Once connected, every change to the gain node is forwarded as a `gain`
/// event until the track is stopped.
pub struct BridgeTrack {
    tab: TabId,
    stream_id: SessionKey,
    output: mpsc::UnboundedSender<BridgeOutput>,
    forwarder: Option<JoinHandle<()>>,
}

impl BridgeTrack {
    /// Track for one capture stream.
    pub fn new(
        tab: TabId,
        stream_id: SessionKey,
        output: mpsc::UnboundedSender<BridgeOutput>,
    ) -> Self {
        Self {
            tab,
            stream_id,
            output,
            forwarder: None,
        }
    }
}

impl MediaTrack for BridgeTrack {
    fn connect(&mut self, gain: GainNode) -> CoreResult<()> {
        let mut changes = gain.subscribe();

        self.output
            .send(BridgeOutput::Gain {
                id: self.tab,
                stream_id: self.stream_id.clone(),
                gain: *changes.borrow_and_update(),
            })
            .map_err(|_| VolumeError::BackendFailed {
                reason: "Browser bridge is closed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let output = self.output.clone();
        let tab = self.tab;
        let stream_id = self.stream_id.clone();

        self.forwarder = Some(tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let gain = *changes.borrow_and_update();
                let message = BridgeOutput::Gain {
                    id: tab,
                    stream_id: stream_id.clone(),
                    gain,
                };
                if output.send(message).is_err() {
                    break;
                }
            }
            debug!(tab_id = %tab, session = %stream_id, "Gain forwarding ended");
        }));

        Ok(())
    }

    fn stop(&mut self) {
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }

        let _ = self.output.send(BridgeOutput::CaptureStopped {
            id: self.tab,
            stream_id: self.stream_id.clone(),
        });
    }
}
