use crate::{
    Indicator, PreferenceStore, TabCapture, Tabs, capture::CaptureBackend, host::NativeTransport,
};

use std::sync::Arc;

/// External collaborators the coordinator is wired to.
pub struct CoordinatorParts {
    /// Opens native host connections.
    pub transport: Arc<dyn NativeTransport>,
    /// Tab metadata.
    pub tabs: Arc<dyn Tabs>,
    /// Issues capture stream ids.
    pub capture: Arc<dyn TabCapture>,
    /// Audio-capable context.
    pub backend: Arc<dyn CaptureBackend>,
    /// Per-domain volume storage.
    pub preferences: Arc<dyn PreferenceStore>,
    /// Icon and badge sink.
    pub indicator: Arc<dyn Indicator>,
}
