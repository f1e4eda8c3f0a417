//! Capture context reached through a request/reply channel.
//!
//! The coordinator side holds an [`OffscreenBackend`]; the graphs live in a
//! worker task that owns the [`GraphRegistry`] outright. The worker is spawned
//! on first use and respawned if it ever stops.

use crate::{
    CoreResult, SessionKey, VolumeError,
    capture::{CaptureBackend, CaptureReply, CaptureRequest, GraphRegistry, MediaDevices},
};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

/// Pending requests the capture context will queue before senders wait.
const OFFSCREEN_QUEUE: usize = 32;

enum OffscreenRequest {
    SetVolume {
        request: CaptureRequest,
        reply: oneshot::Sender<CaptureReply>,
    },
    Teardown {
        stream_id: SessionKey,
        done: oneshot::Sender<()>,
    },
    TeardownAll {
        done: oneshot::Sender<()>,
    },
}

/// [`CaptureBackend`] that forwards to a lazily started capture context.
pub struct OffscreenBackend {
    media: Arc<dyn MediaDevices>,
    worker: Mutex<Option<mpsc::Sender<OffscreenRequest>>>,
    activations: AtomicUsize,
}

impl OffscreenBackend {
    /// Create the backend. No context is started until the first request.
    pub fn new(media: Arc<dyn MediaDevices>) -> Self {
        Self {
            media,
            worker: Mutex::new(None),
            activations: AtomicUsize::new(0),
        }
    }

    /// How many times the capture context has been started.
    pub fn activations(&self) -> usize {
        self.activations.load(Ordering::Acquire)
    }

    /// Whether a capture context is currently running.
    pub async fn is_running(&self) -> bool {
        self.running().await.is_some()
    }

    async fn running(&self) -> Option<mpsc::Sender<OffscreenRequest>> {
        let worker = self.worker.lock().await;
        worker.as_ref().filter(|tx| !tx.is_closed()).cloned()
    }

    async fn ensure_running(&self) -> mpsc::Sender<OffscreenRequest> {
        let mut worker = self.worker.lock().await;

        if let Some(tx) = worker.as_ref().filter(|tx| !tx.is_closed()) {
            return tx.clone();
        }

        let (tx, rx) = mpsc::channel(OFFSCREEN_QUEUE);
        tokio::spawn(run_context(GraphRegistry::new(Arc::clone(&self.media)), rx));
        self.activations.fetch_add(1, Ordering::AcqRel);
        *worker = Some(tx.clone());

        info!("Capture context started");

        tx
    }

    #[track_caller]
    fn unreachable(reason: String) -> VolumeError {
        VolumeError::BackendUnreachable {
            reason,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

#[async_trait]
impl CaptureBackend for OffscreenBackend {
    #[instrument(skip(self))]
    async fn set_volume(&self, request: CaptureRequest) -> CoreResult<CaptureReply> {
        let tx = self.ensure_running().await;
        let (reply_tx, reply_rx) = oneshot::channel();

        tx.send(OffscreenRequest::SetVolume {
            request,
            reply: reply_tx,
        })
        .await
        .map_err(|e| Self::unreachable(format!("Failed to deliver request: {}", e)))?;

        reply_rx
            .await
            .map_err(|e| Self::unreachable(format!("Capture context dropped reply: {}", e)))
    }

    async fn teardown(&self, stream_id: &SessionKey) -> CoreResult<()> {
        let Some(tx) = self.running().await else {
            return Ok(());
        };
        let (done_tx, done_rx) = oneshot::channel();

        tx.send(OffscreenRequest::Teardown {
            stream_id: stream_id.clone(),
            done: done_tx,
        })
        .await
        .map_err(|e| Self::unreachable(format!("Failed to deliver teardown: {}", e)))?;

        done_rx
            .await
            .map_err(|e| Self::unreachable(format!("Capture context dropped reply: {}", e)))
    }

    async fn teardown_all(&self) -> CoreResult<()> {
        let Some(tx) = self.running().await else {
            return Ok(());
        };
        let (done_tx, done_rx) = oneshot::channel();

        tx.send(OffscreenRequest::TeardownAll { done: done_tx })
            .await
            .map_err(|e| Self::unreachable(format!("Failed to deliver teardown: {}", e)))?;

        done_rx
            .await
            .map_err(|e| Self::unreachable(format!("Capture context dropped reply: {}", e)))
    }
}

/// Capture context main loop. Exits when every sender is gone.
async fn run_context(mut graphs: GraphRegistry, mut rx: mpsc::Receiver<OffscreenRequest>) {
    while let Some(message) = rx.recv().await {
        match message {
            OffscreenRequest::SetVolume { request, reply } => {
                let gain = request.volume.gain();
                let ok = match graphs.set_gain(&request.stream_id, gain).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(
                            tab_id = %request.tab,
                            session = %request.stream_id,
                            error = ?e,
                            "Failed to apply gain, closing capture"
                        );
                        graphs.teardown(&request.stream_id);
                        false
                    }
                };

                if reply.send(CaptureReply { ok }).is_err() {
                    debug!(tab_id = %request.tab, "Requester went away before reply");
                }
            }
            OffscreenRequest::Teardown { stream_id, done } => {
                graphs.teardown(&stream_id);
                let _ = done.send(());
            }
            OffscreenRequest::TeardownAll { done } => {
                graphs.teardown_all();
                let _ = done.send(());
            }
        }
    }

    graphs.teardown_all();
    info!("Capture context stopped");
}
