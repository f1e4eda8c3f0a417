//! Test doubles for the browser-facing traits.

#![allow(clippy::unwrap_used)]

use crate::{
    ConnectionIcon, CoordinatorParts, CoreResult, Indicator, MemoryPreferenceStore,
    PreferenceStore, SessionKey, TabCapture, TabId, TabInfo, Tabs, Volume, VolumeError,
    capture::{
        CaptureBackend, CaptureReply, CaptureRequest, GainNode, MediaDevices, MediaTrack,
        OffscreenBackend,
    },
    host::{HostPort, NativeTransport, PortPeer},
};

use std::{
    collections::HashSet,
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::{
    sync::{mpsc, oneshot},
    time::Instant,
};

pub(crate) fn tab(id: i64, title: &str, url: &str) -> TabInfo {
    TabInfo {
        id: TabId(id),
        title: title.to_string(),
        url: url.to_string(),
    }
}

pub(crate) fn volume(percent: u8) -> Volume {
    Volume::new(percent).unwrap()
}

/// Poll `condition` until it holds, giving spawned tasks time to run.
pub(crate) async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}

// ---------------------------------------------------------------- tabs

pub(crate) struct FakeTabs {
    tabs: Mutex<Vec<TabInfo>>,
}

impl FakeTabs {
    pub(crate) fn new(tabs: Vec<TabInfo>) -> Arc<Self> {
        Arc::new(Self {
            tabs: Mutex::new(tabs),
        })
    }

    pub(crate) fn set_url(&self, tab_id: TabId, url: &str) {
        let mut tabs = self.tabs.lock().unwrap();
        if let Some(tab) = tabs.iter_mut().find(|t| t.id == tab_id) {
            tab.url = url.to_string();
        }
    }
}

#[async_trait]
impl Tabs for FakeTabs {
    async fn query(&self) -> CoreResult<Vec<TabInfo>> {
        Ok(self.tabs.lock().unwrap().clone())
    }

    async fn get(&self, tab_id: TabId) -> CoreResult<TabInfo> {
        self.tabs
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == tab_id)
            .cloned()
            .ok_or_else(|| VolumeError::TabNotFound {
                tab_id,
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

// ---------------------------------------------------------------- capture ids

#[derive(Default)]
pub(crate) struct FakeCapture {
    pub(crate) issued: AtomicUsize,
    denied: Mutex<HashSet<TabId>>,
}

impl FakeCapture {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn deny(&self, tab_id: TabId) {
        self.denied.lock().unwrap().insert(tab_id);
    }

    pub(crate) fn issued(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TabCapture for FakeCapture {
    async fn media_stream_id(&self, tab_id: TabId) -> CoreResult<SessionKey> {
        if self.denied.lock().unwrap().contains(&tab_id) {
            return Err(VolumeError::CaptureUnavailable {
                tab_id,
                reason: "permission denied".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        // Yield so concurrent callers can interleave on first acquisition.
        tokio::task::yield_now().await;
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        Ok(SessionKey::new(format!("stream-{}-{}", tab_id, n)))
    }
}

// ---------------------------------------------------------------- media

#[derive(Clone, Default)]
pub(crate) struct TrackProbe {
    pub(crate) stopped: Arc<AtomicBool>,
    pub(crate) gain: Arc<Mutex<Option<GainNode>>>,
}

impl TrackProbe {
    pub(crate) fn gain_value(&self) -> Option<f32> {
        self.gain.lock().unwrap().as_ref().map(GainNode::value)
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

struct FakeTrack {
    probe: TrackProbe,
    fail_connect: bool,
}

impl MediaTrack for FakeTrack {
    fn connect(&mut self, gain: GainNode) -> CoreResult<()> {
        if self.fail_connect {
            return Err(VolumeError::BackendFailed {
                reason: "audio graph setup failed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        *self.probe.gain.lock().unwrap() = Some(gain);
        Ok(())
    }

    fn stop(&mut self) {
        self.probe.stopped.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub(crate) struct FakeMedia {
    pub(crate) fail_open: AtomicBool,
    pub(crate) fail_connect: AtomicBool,
    tracks: Mutex<Vec<(SessionKey, TrackProbe)>>,
}

impl FakeMedia {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn opened(&self) -> usize {
        self.tracks.lock().unwrap().len()
    }

    pub(crate) fn probes(&self) -> Vec<(SessionKey, TrackProbe)> {
        self.tracks.lock().unwrap().clone()
    }

    pub(crate) fn last_probe(&self) -> TrackProbe {
        self.tracks.lock().unwrap().last().unwrap().1.clone()
    }
}

#[async_trait]
impl MediaDevices for FakeMedia {
    async fn open_tab_audio(&self, stream_id: &SessionKey) -> CoreResult<Box<dyn MediaTrack>> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(VolumeError::BackendFailed {
                reason: "getUserMedia rejected".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        let probe = TrackProbe::default();
        self.tracks
            .lock()
            .unwrap()
            .push((stream_id.clone(), probe.clone()));
        Ok(Box::new(FakeTrack {
            probe,
            fail_connect: self.fail_connect.load(Ordering::SeqCst),
        }))
    }
}

// ---------------------------------------------------------------- backend

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum BackendMode {
    Accept,
    Reject,
    Unreachable,
}

pub(crate) struct ScriptedBackend {
    mode: Mutex<BackendMode>,
    pub(crate) requests: Mutex<Vec<CaptureRequest>>,
    pub(crate) teardowns: Mutex<Vec<SessionKey>>,
}

impl ScriptedBackend {
    pub(crate) fn new(mode: BackendMode) -> Arc<Self> {
        Arc::new(Self {
            mode: Mutex::new(mode),
            requests: Mutex::new(Vec::new()),
            teardowns: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn set_mode(&self, mode: BackendMode) {
        *self.mode.lock().unwrap() = mode;
    }
}

#[async_trait]
impl CaptureBackend for ScriptedBackend {
    async fn set_volume(&self, request: CaptureRequest) -> CoreResult<CaptureReply> {
        self.requests.lock().unwrap().push(request);
        match *self.mode.lock().unwrap() {
            BackendMode::Accept => Ok(CaptureReply { ok: true }),
            BackendMode::Reject => Ok(CaptureReply { ok: false }),
            BackendMode::Unreachable => Err(VolumeError::BackendUnreachable {
                reason: "no receiver".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }

    async fn teardown(&self, stream_id: &SessionKey) -> CoreResult<()> {
        self.teardowns.lock().unwrap().push(stream_id.clone());
        Ok(())
    }

    async fn teardown_all(&self) -> CoreResult<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------- indicator

#[derive(Default)]
pub(crate) struct RecordingIndicator {
    pub(crate) icons: Mutex<Vec<ConnectionIcon>>,
    pub(crate) badges: Mutex<Vec<(TabId, String)>>,
}

impl RecordingIndicator {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn icons(&self) -> Vec<ConnectionIcon> {
        self.icons.lock().unwrap().clone()
    }

    pub(crate) fn last_icon(&self) -> Option<ConnectionIcon> {
        self.icons.lock().unwrap().last().copied()
    }

    pub(crate) fn badges(&self) -> Vec<(TabId, String)> {
        self.badges.lock().unwrap().clone()
    }
}

impl Indicator for RecordingIndicator {
    fn set_connection_state(&self, icon: ConnectionIcon) -> CoreResult<()> {
        self.icons.lock().unwrap().push(icon);
        Ok(())
    }

    fn set_tab_badge(&self, tab_id: TabId, text: &str) -> CoreResult<()> {
        self.badges.lock().unwrap().push((tab_id, text.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------- preferences

pub(crate) struct FailingPreferenceStore;

#[async_trait]
impl PreferenceStore for FailingPreferenceStore {
    async fn get(&self, _domain: &str) -> CoreResult<Option<Volume>> {
        Err(VolumeError::Storage {
            reason: "quota exceeded".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    async fn set(&self, _domain: &str, _volume: Volume) -> CoreResult<()> {
        Err(VolumeError::Storage {
            reason: "quota exceeded".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

// ---------------------------------------------------------------- transport

/// Fails the first `failures` connects, then hands each new port's peer end
/// to the test through `peers`.
pub(crate) struct FakeTransport {
    failures: usize,
    pub(crate) attempts: Mutex<Vec<Instant>>,
    peers: mpsc::UnboundedSender<PortPeer>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeTransport {
    pub(crate) fn new(failures: usize) -> (Arc<Self>, mpsc::UnboundedReceiver<PortPeer>) {
        let (peers_tx, peers_rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                failures,
                attempts: Mutex::new(Vec::new()),
                peers: peers_tx,
                gate: Mutex::new(None),
            }),
            peers_rx,
        )
    }

    /// Hold the next connect attempt open until the returned sender fires.
    pub(crate) fn hold_next(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(gate);
        release
    }

    pub(crate) fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    /// Gaps between consecutive connect attempts, in milliseconds.
    pub(crate) fn gaps_ms(&self) -> Vec<u128> {
        let attempts = self.attempts.lock().unwrap();
        attempts
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).as_millis())
            .collect()
    }
}

#[async_trait]
impl NativeTransport for FakeTransport {
    async fn connect(&self, _host_name: &str) -> CoreResult<HostPort> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(Instant::now());
            attempts.len()
        };

        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if attempt <= self.failures {
            return Err(VolumeError::Transport {
                reason: "Specified native messaging host not found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let (port, peer) = HostPort::pair();
        let _ = self.peers.send(peer);
        Ok(port)
    }
}

// ---------------------------------------------------------------- wiring

pub(crate) struct Fixture {
    pub(crate) tabs: Arc<FakeTabs>,
    pub(crate) capture: Arc<FakeCapture>,
    pub(crate) media: Arc<FakeMedia>,
    pub(crate) backend: Arc<OffscreenBackend>,
    pub(crate) preferences: Arc<MemoryPreferenceStore>,
    pub(crate) indicator: Arc<RecordingIndicator>,
    pub(crate) transport: Arc<FakeTransport>,
    pub(crate) peers: mpsc::UnboundedReceiver<PortPeer>,
}

impl Fixture {
    pub(crate) fn new(tabs: Vec<TabInfo>, transport_failures: usize) -> Self {
        let (transport, peers) = FakeTransport::new(transport_failures);
        let media = FakeMedia::new();
        Self {
            tabs: FakeTabs::new(tabs),
            capture: FakeCapture::new(),
            backend: Arc::new(OffscreenBackend::new(
                Arc::clone(&media) as Arc<dyn MediaDevices>
            )),
            media,
            preferences: Arc::new(MemoryPreferenceStore::new()),
            indicator: RecordingIndicator::new(),
            transport,
            peers,
        }
    }

    pub(crate) fn parts(&self) -> CoordinatorParts {
        CoordinatorParts {
            transport: Arc::clone(&self.transport) as Arc<dyn NativeTransport>,
            tabs: Arc::clone(&self.tabs) as Arc<dyn Tabs>,
            capture: Arc::clone(&self.capture) as Arc<dyn TabCapture>,
            backend: Arc::clone(&self.backend) as Arc<dyn CaptureBackend>,
            preferences: Arc::clone(&self.preferences) as Arc<dyn PreferenceStore>,
            indicator: Arc::clone(&self.indicator) as Arc<dyn Indicator>,
        }
    }

    pub(crate) async fn stored(&self, domain: &str) -> Option<Volume> {
        self.preferences.get(domain).await.unwrap()
    }
}
