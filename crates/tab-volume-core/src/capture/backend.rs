use crate::{CoreResult, SessionKey, TabId, Volume};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Cross-context request to apply a volume to a capture session.
///
/// Serializes as `{"type":"setvol","streamId":..,"tab":..,"volume":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "setvol", rename_all = "camelCase")]
pub struct CaptureRequest {
    /// Capture stream id identifying the session.
    pub stream_id: SessionKey,
    /// Tab the stream belongs to.
    pub tab: TabId,
    /// Target volume.
    pub volume: Volume,
}

/// Reply to a [`CaptureRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureReply {
    /// Whether the graph now plays at the requested gain.
    pub ok: bool,
}

/// The audio-capable side of the context boundary.
///
/// Implementations may live in a different execution context than the
/// caller and may start that context lazily.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Build or update the graph for `request.stream_id`.
    ///
    /// A delivered request always gets a reply; `Err` means the backend could
    /// not be reached at all.
    async fn set_volume(&self, request: CaptureRequest) -> CoreResult<CaptureReply>;

    /// Tear down the graph for one session, if present.
    async fn teardown(&self, stream_id: &SessionKey) -> CoreResult<()>;

    /// Tear down every graph.
    async fn teardown_all(&self) -> CoreResult<()>;
}
