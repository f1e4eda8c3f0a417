use crate::{CoreResult, SessionKey, capture::GainNode};

use async_trait::async_trait;

/// Source of tab audio tracks inside the capture context.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Open the audio track for a previously issued capture stream id.
    ///
    /// Stream ids are single-use on the browser side, so callers open each
    /// id at most once per graph.
    async fn open_tab_audio(&self, stream_id: &SessionKey) -> CoreResult<Box<dyn MediaTrack>>;
}

/// A live tab audio track.
pub trait MediaTrack: Send {
    /// Route the track through `gain` to the audio output.
    fn connect(&mut self, gain: GainNode) -> CoreResult<()>;

    /// Stop the track and release the underlying capture.
    fn stop(&mut self);
}
