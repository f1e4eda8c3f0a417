//! Reconnecting client for the native companion process.
//!
//! Every failure (open, send, disconnect) lands in the same place: local port
//! state is dropped and a reconnect is scheduled with exponential backoff.
//! Nothing here returns an error to the caller.

use crate::{
    ConnectionIcon, StatusIndicator, TabId, Tabs, Volume, VolumePipeline,
    host::{
        Backoff, ConnectionState, ConnectorConfig, HostMessage, HostPort, NativeTransport,
        VolumeTarget, ping, tab_list,
    },
};

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use serde_json::Value;
use tokio::{sync::mpsc, task::JoinHandle, task::JoinSet};
use tracing::{debug, error, info, instrument, warn};

struct ConnectorInner {
    state: ConnectionState,
    backoff: Backoff,
    reconnect: Option<JoinHandle<()>>,
    outbound: Option<mpsc::Sender<Value>>,
    /// Bumped on every successful connect so stale readers can tell.
    generation: u64,
}

/// Native host connection with reconnect and command dispatch.
pub struct NativeHostConnector {
    config: ConnectorConfig,
    transport: Arc<dyn NativeTransport>,
    pipeline: Arc<VolumePipeline>,
    tabs: Arc<dyn Tabs>,
    indicator: Arc<StatusIndicator>,
    inner: Mutex<ConnectorInner>,
}

impl NativeHostConnector {
    /// Create a disconnected connector. Call [`NativeHostConnector::connect`]
    /// to start the connection cycle.
    pub fn new(
        config: ConnectorConfig,
        transport: Arc<dyn NativeTransport>,
        pipeline: Arc<VolumePipeline>,
        tabs: Arc<dyn Tabs>,
        indicator: Arc<StatusIndicator>,
    ) -> Arc<Self> {
        let backoff = Backoff::new(config.initial_backoff, config.max_backoff);

        Arc::new(Self {
            config,
            transport,
            pipeline,
            tabs,
            indicator,
            inner: Mutex::new(ConnectorInner {
                state: ConnectionState::Disconnected,
                backoff,
                reconnect: None,
                outbound: None,
                generation: 0,
            }),
        })
    }

    /// Current link state.
    pub fn state(&self) -> ConnectionState {
        self.lock().state
    }

    /// Whether the host signalled readiness on the current connection.
    pub fn is_ready(&self) -> bool {
        self.state() == ConnectionState::Ready
    }

    /// Delay the next reconnect would wait.
    pub fn current_backoff(&self) -> Duration {
        self.lock().backoff.current()
    }

    /// Whether a reconnect timer is pending.
    pub fn reconnect_pending(&self) -> bool {
        self.lock().reconnect.is_some()
    }

    /// Open the connection and send the liveness probe.
    ///
    /// No-op while a port is open or another attempt is in flight. Any
    /// failure schedules a reconnect.
    #[instrument(skip(self), fields(host = %self.config.host_name))]
    pub async fn connect(self: &Arc<Self>) {
        let started = {
            let mut inner = self.lock();
            if inner.outbound.is_some() || inner.state == ConnectionState::Connecting {
                debug!(state = ?inner.state, "Connect skipped, link already active");
                return;
            }
            inner.state = ConnectionState::Connecting;
            inner.generation
        };

        // A shutdown during the attempt bumps the generation and voids the outcome.
        let port = match self.transport.connect(&self.config.host_name).await {
            Ok(port) => port,
            Err(e) => {
                {
                    let mut inner = self.lock();
                    if inner.generation != started {
                        debug!("Connector shut down during connect");
                        return;
                    }
                    inner.state = ConnectionState::Disconnected;
                }
                warn!(error = ?e, "Failed to connect to native host");
                self.schedule_reconnect();
                return;
            }
        };

        let HostPort { outbound, inbound } = port;

        let (generation, icon) = {
            let mut inner = self.lock();
            if inner.generation != started {
                debug!("Connector shut down during connect, port dropped");
                return;
            }
            inner.state = ConnectionState::Connected;
            inner.backoff.reset();
            inner.outbound = Some(outbound.clone());
            inner.generation += 1;
            (inner.generation, inner.state.icon())
        };

        self.indicator.set_connection(icon);
        info!(generation, "Connected to native host");

        tokio::spawn(Arc::clone(self).read_loop(inbound, generation));

        match outbound.try_send(ping()) {
            Ok(()) => debug!("Liveness probe sent"),
            Err(e) => {
                warn!(error = %e, "Liveness probe failed");
                self.handle_disconnect(generation);
            }
        }
    }

    /// Arrange for [`NativeHostConnector::connect`] to run after the current
    /// backoff delay, then double the delay.
    ///
    /// At most one reconnect is ever pending; further calls only refresh the
    /// icon.
    pub fn schedule_reconnect(self: &Arc<Self>) {
        self.indicator.set_connection(ConnectionIcon::Disconnected);

        let mut inner = self.lock();
        if inner.reconnect.is_some() {
            debug!("Reconnect already scheduled");
            return;
        }

        let delay = inner.backoff.next_delay();
        info!(
            delay_ms = delay.as_millis() as u64,
            "Scheduling native host reconnect"
        );

        let this = Arc::clone(self);
        inner.reconnect = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            this.lock().reconnect = None;
            this.connect().await;
        }));
    }

    /// Send the open-tab listing to the host.
    ///
    /// Dropped silently unless broadcasting is enabled and the host is
    /// ready. Returns whether a listing was posted.
    pub async fn broadcast_tab_list(self: &Arc<Self>) -> bool {
        if !self.config.broadcast_tabs {
            return false;
        }

        if !self.is_ready() {
            debug!("Native host not ready, tab list dropped");
            return false;
        }

        let tabs = match self.tabs.query().await {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!(error = ?e, "Failed to query tabs for host listing");
                return false;
            }
        };

        // The link may have dropped while tabs were queried.
        if !self.is_ready() {
            return false;
        }

        self.post(tab_list(&tabs))
    }

    /// Close the link and cancel any pending reconnect.
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        if let Some(reconnect) = inner.reconnect.take() {
            reconnect.abort();
        }
        inner.outbound = None;
        inner.state = ConnectionState::Disconnected;
        inner.generation += 1;
        info!("Native host connector shut down");
    }

    async fn read_loop(self: Arc<Self>, mut inbound: mpsc::Receiver<Value>, generation: u64) {
        while let Some(message) = inbound.recv().await {
            if self.lock().generation != generation {
                debug!(generation, "Stale connection reader exiting");
                return;
            }
            self.handle_message(message).await;
        }

        self.handle_disconnect(generation);
    }

    async fn handle_message(self: &Arc<Self>, message: Value) {
        debug!(%message, "Native host message");

        match HostMessage::decode(message) {
            Ok(HostMessage::Ready) => {
                {
                    let mut inner = self.lock();
                    if inner.state == ConnectionState::Connected {
                        inner.state = ConnectionState::Ready;
                    }
                }
                info!("Native host ready");
                self.broadcast_tab_list().await;
            }
            Ok(HostMessage::SetVolume { target, volume }) => {
                self.dispatch_volume(target, volume).await;
            }
            Ok(HostMessage::Unknown) => debug!("Ignoring unrecognised host message"),
            Err(e) => {
                warn!(error = ?e, "Malformed native host message");
                self.indicator.flash_error();
            }
        }
    }

    /// Apply a host volume command to every addressed tab.
    ///
    /// Tabs are applied independently; one failure flashes the error
    /// indicator without stopping the rest.
    async fn dispatch_volume(&self, target: VolumeTarget, volume: Volume) {
        let tab_ids: Vec<TabId> = match target {
            VolumeTarget::Tab(tab_id) => vec![tab_id],
            VolumeTarget::TitleFilters(filters) => match self.tabs.query().await {
                Ok(tabs) => tabs
                    .into_iter()
                    .filter(|tab| tab.title_matches(&filters))
                    .map(|tab| tab.id)
                    .collect(),
                Err(e) => {
                    warn!(error = ?e, "Failed to query tabs for host command");
                    self.indicator.flash_error();
                    return;
                }
            },
        };

        if tab_ids.is_empty() {
            info!(%volume, "Host volume command matched no tabs");
            return;
        }

        let mut batch = JoinSet::new();
        for tab_id in tab_ids {
            let pipeline = Arc::clone(&self.pipeline);
            batch.spawn(async move { (tab_id, pipeline.apply_volume(tab_id, volume).await) });
        }

        while let Some(outcome) = batch.join_next().await {
            match outcome {
                Ok((_, true)) => {}
                Ok((tab_id, false)) => {
                    warn!(tab_id = %tab_id, %volume, "Host volume command failed");
                    self.indicator.flash_error();
                }
                Err(e) => {
                    error!(error = ?e, "Host volume task panicked");
                    self.indicator.flash_error();
                }
            }
        }
    }

    /// Post a message on the current port. A failed post counts as a
    /// disconnect.
    fn post(self: &Arc<Self>, message: Value) -> bool {
        let (outbound, generation) = {
            let inner = self.lock();
            match &inner.outbound {
                Some(outbound) => (outbound.clone(), inner.generation),
                None => return false,
            }
        };

        match outbound.try_send(message) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to post to native host");
                self.handle_disconnect(generation);
                false
            }
        }
    }

    fn handle_disconnect(self: &Arc<Self>, generation: u64) {
        {
            let mut inner = self.lock();
            if inner.generation != generation || inner.outbound.is_none() {
                return;
            }
            inner.outbound = None;
            inner.state = ConnectionState::Disconnected;
        }

        warn!(generation, "Native host disconnected");
        self.schedule_reconnect();
    }

    fn lock(&self) -> MutexGuard<'_, ConnectorInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
