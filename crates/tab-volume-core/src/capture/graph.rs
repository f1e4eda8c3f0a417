use crate::{
    CoreResult, SessionKey,
    capture::{MediaDevices, MediaTrack},
};

use std::{collections::HashMap, sync::Arc};

use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// Scalar gain stage shared between the graph owner and the render path.
///
/// Cloning yields another handle to the same gain value. Renderers either
/// read [`GainNode::value`] or [`GainNode::subscribe`] to changes.
#[derive(Debug, Clone)]
pub struct GainNode {
    value: Arc<watch::Sender<f32>>,
}

impl GainNode {
    /// Create a gain node with an initial gain factor.
    pub fn new(gain: f32) -> Self {
        let (tx, _rx) = watch::channel(gain);
        Self { value: Arc::new(tx) }
    }

    /// Current gain factor.
    pub fn value(&self) -> f32 {
        *self.value.borrow()
    }

    /// Update the gain factor in place.
    pub fn set(&self, gain: f32) {
        self.value.send_replace(gain);
    }

    /// Receiver that observes every gain update.
    pub fn subscribe(&self) -> watch::Receiver<f32> {
        self.value.subscribe()
    }
}

/// One tab's audio graph: track → gain → output.
pub struct CaptureGraph {
    track: Box<dyn MediaTrack>,
    gain: GainNode,
}

impl CaptureGraph {
    /// Gain stage of this graph.
    pub fn gain(&self) -> &GainNode {
        &self.gain
    }

    fn close(mut self) {
        self.track.stop();
    }
}

/// Owner of every capture graph, keyed by session key.
///
/// Holds at most one graph (and so one gain node) per key. Only the capture
/// context mutates it.
pub struct GraphRegistry {
    media: Arc<dyn MediaDevices>,
    graphs: HashMap<SessionKey, CaptureGraph>,
}

impl GraphRegistry {
    /// Create an empty registry that opens tracks through `media`.
    pub fn new(media: Arc<dyn MediaDevices>) -> Self {
        Self {
            media,
            graphs: HashMap::new(),
        }
    }

    /// Set the gain for a session, building its graph on first use.
    ///
    /// An existing graph is updated in place. On failure nothing is
    /// registered and any partially opened track is stopped.
    #[instrument(skip(self))]
    pub async fn set_gain(&mut self, key: &SessionKey, gain: f32) -> CoreResult<()> {
        if let Some(graph) = self.graphs.get(key) {
            graph.gain.set(gain);
            debug!(session = %key, gain, "Gain updated");
            return Ok(());
        }

        let mut track = self.media.open_tab_audio(key).await?;
        let gain_node = GainNode::new(gain);

        if let Err(e) = track.connect(gain_node.clone()) {
            track.stop();
            return Err(e);
        }

        self.graphs.insert(
            key.clone(),
            CaptureGraph {
                track,
                gain: gain_node,
            },
        );

        info!(session = %key, gain, "Capture graph created");

        Ok(())
    }

    /// Stop and drop the graph for a session. Returns whether one existed.
    pub fn teardown(&mut self, key: &SessionKey) -> bool {
        match self.graphs.remove(key) {
            Some(graph) => {
                graph.close();
                info!(session = %key, "Capture graph torn down");
                true
            }
            None => false,
        }
    }

    /// Stop and drop every graph.
    pub fn teardown_all(&mut self) {
        let count = self.graphs.len();
        for (_, graph) in self.graphs.drain() {
            graph.close();
        }
        if count > 0 {
            info!(count, "Tore down all capture graphs");
        }
    }

    /// Graph for a session, if built.
    pub fn get(&self, key: &SessionKey) -> Option<&CaptureGraph> {
        self.graphs.get(key)
    }

    /// Number of live graphs.
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Whether no graph is live.
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}
