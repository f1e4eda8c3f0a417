use crate::{
    ConnectionIcon, CoordinatorParts, PreferenceStore, SessionRegistry, StatusIndicator, TabChange,
    TabId, Tabs, UiRequest, Volume, VolumePipeline,
    capture::CaptureBackend,
    domain::domain_of,
    host::{ConnectorConfig, NativeHostConnector},
};

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

/// Process-wide entry point.
///
/// Owns the single session registry and native host connector, and routes
/// UI requests, host commands and tab events into the volume pipeline.
pub struct Coordinator {
    sessions: Arc<SessionRegistry>,
    pipeline: Arc<VolumePipeline>,
    connector: Arc<NativeHostConnector>,
    backend: Arc<dyn CaptureBackend>,
    tabs: Arc<dyn Tabs>,
    preferences: Arc<dyn PreferenceStore>,
    indicator: Arc<StatusIndicator>,
}

impl Coordinator {
    /// Wire the collaborators together. Nothing connects until
    /// [`Coordinator::start`].
    pub fn new(parts: CoordinatorParts, config: ConnectorConfig) -> Self {
        let CoordinatorParts {
            transport,
            tabs,
            capture,
            backend,
            preferences,
            indicator,
        } = parts;

        let indicator = StatusIndicator::new(indicator);
        let sessions = Arc::new(SessionRegistry::new(capture));

        let pipeline = Arc::new(VolumePipeline::new(
            Arc::clone(&sessions),
            Arc::clone(&backend),
            Arc::clone(&tabs),
            Arc::clone(&preferences),
            Arc::clone(&indicator),
        ));

        let connector = NativeHostConnector::new(
            config,
            transport,
            Arc::clone(&pipeline),
            Arc::clone(&tabs),
            Arc::clone(&indicator),
        );

        Self {
            sessions,
            pipeline,
            connector,
            backend,
            tabs,
            preferences,
            indicator,
        }
    }

    /// Show the disconnected icon and start the native host connection cycle.
    pub async fn start(&self) {
        self.indicator.set_connection(ConnectionIcon::Disconnected);
        self.connector.connect().await;
        info!(state = ?self.connector.state(), "Coordinator started");
    }

    /// Native host connector.
    pub fn connector(&self) -> &Arc<NativeHostConnector> {
        &self.connector
    }

    /// Session registry.
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Volume pipeline.
    pub fn pipeline(&self) -> &Arc<VolumePipeline> {
        &self.pipeline
    }

    /// Status indicator.
    pub fn indicator(&self) -> &Arc<StatusIndicator> {
        &self.indicator
    }

    /// Handle a volume request from a UI or content context.
    ///
    /// `sender_tab` resolves the [`TabId::SENDER`] sentinel. The pipeline
    /// runs in its own task so a panic there becomes `false` here. Failures
    /// flash the error indicator.
    #[instrument(skip(self))]
    pub async fn handle_ui_request(&self, request: UiRequest, sender_tab: Option<TabId>) -> bool {
        let tab_id = match (request.id.is_sender(), sender_tab) {
            (false, _) => request.id,
            (true, Some(sender)) => sender,
            (true, None) => {
                warn!("Request addressed the sender tab but came from no tab");
                self.indicator.flash_error();
                return false;
            }
        };

        let volume = match Volume::from_wire(request.volume) {
            Ok(volume) => volume,
            Err(e) => {
                warn!(tab_id = %tab_id, error = ?e, "Rejected UI volume request");
                self.indicator.flash_error();
                return false;
            }
        };

        let pipeline = Arc::clone(&self.pipeline);
        let task = tokio::spawn(async move { pipeline.apply_volume(tab_id, volume).await });
        let ok = match task.await {
            Ok(ok) => ok,
            Err(e) => {
                error!(tab_id = %tab_id, error = ?e, "Volume task panicked");
                false
            }
        };

        if !ok {
            self.indicator.flash_error();
        }

        ok
    }

    /// React to tab metadata changes by refreshing the host's tab listing.
    pub async fn on_tab_updated(&self, tab_id: TabId, change: &TabChange) {
        if !change.affects_listing() {
            return;
        }
        debug!(tab_id = %tab_id, "Tab listing changed");
        self.connector.broadcast_tab_list().await;
    }

    /// Release the capture held for a closed tab.
    pub async fn on_tab_removed(&self, tab_id: TabId) {
        self.pipeline.forget_tab(tab_id).await;
    }

    /// Stored volume for a tab's domain, as shown when the UI opens.
    ///
    /// Unknown domains are initialised to full volume. Lookup and storage
    /// problems fall back to full volume.
    #[instrument(skip(self))]
    pub async fn preferred_volume(&self, tab_id: TabId) -> Volume {
        let tab = match self.tabs.get(tab_id).await {
            Ok(tab) => tab,
            Err(e) => {
                debug!(tab_id = %tab_id, error = ?e, "Tab lookup failed");
                return Volume::FULL;
            }
        };

        let Some(domain) = domain_of(&tab.url) else {
            return Volume::FULL;
        };

        match self.preferences.get(&domain).await {
            Ok(Some(volume)) => volume,
            Ok(None) => {
                if let Err(e) = self.preferences.set(&domain, Volume::FULL).await {
                    warn!(domain = %domain, error = ?e, "Failed to initialise preference");
                }
                Volume::FULL
            }
            Err(e) => {
                warn!(domain = %domain, error = ?e, "Failed to read preference");
                Volume::FULL
            }
        }
    }

    /// Tear everything down on unload: host link, sessions and graphs.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        self.connector.shutdown();

        let sessions = self.sessions.teardown_all();
        if let Err(e) = self.backend.teardown_all().await {
            warn!(error = ?e, "Failed to tear down capture graphs");
        }

        info!(sessions = sessions.len(), "Coordinator shut down");
    }
}
