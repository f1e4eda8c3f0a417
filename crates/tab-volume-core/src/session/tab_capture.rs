use crate::{CoreResult, SessionKey, TabId};

use async_trait::async_trait;

/// Issues capture stream ids for tabs.
#[async_trait]
pub trait TabCapture: Send + Sync {
    /// Request a fresh capture stream id for `tab_id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::VolumeError::CaptureUnavailable`] when the tab cannot
    /// be captured (closed, restricted page, permission denied).
    async fn media_stream_id(&self, tab_id: TabId) -> CoreResult<SessionKey>;
}
