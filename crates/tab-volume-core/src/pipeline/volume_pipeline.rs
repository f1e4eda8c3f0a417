use crate::{
    CoreResult, PreferenceStore, SessionRegistry, StatusIndicator, TabId, Tabs, Volume,
    VolumeError,
    capture::{CaptureBackend, CaptureRequest},
    domain::domain_of,
    pipeline::TabLocks,
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument, warn};

/// Single entry point for every volume change.
///
/// Sequencing per request: session acquisition, then the capture backend,
/// then persistence and the badge. Requests for one tab are serialized.
pub struct VolumePipeline {
    sessions: Arc<SessionRegistry>,
    backend: Arc<dyn CaptureBackend>,
    tabs: Arc<dyn Tabs>,
    preferences: Arc<dyn PreferenceStore>,
    indicator: Arc<StatusIndicator>,
    locks: TabLocks,
}

impl VolumePipeline {
    /// Assemble the pipeline from its collaborators.
    pub fn new(
        sessions: Arc<SessionRegistry>,
        backend: Arc<dyn CaptureBackend>,
        tabs: Arc<dyn Tabs>,
        preferences: Arc<dyn PreferenceStore>,
        indicator: Arc<StatusIndicator>,
    ) -> Self {
        Self {
            sessions,
            backend,
            tabs,
            preferences,
            indicator,
            locks: TabLocks::default(),
        }
    }

    /// Apply a volume to a tab. Returns `true` once the tab plays at the new
    /// gain; failures are logged and reported as `false`.
    #[instrument(skip(self))]
    pub async fn apply_volume(&self, tab_id: TabId, volume: Volume) -> bool {
        match self.try_apply_volume(tab_id, volume).await {
            Ok(()) => true,
            Err(e) => {
                warn!(tab_id = %tab_id, %volume, error = ?e, "Volume change failed");
                false
            }
        }
    }

    /// Apply a volume to a tab, returning the reason on failure.
    ///
    /// A backend failure tears the tab's session down so the next attempt
    /// acquires capture from scratch. Persistence problems are logged and do
    /// not fail the call.
    pub async fn try_apply_volume(&self, tab_id: TabId, volume: Volume) -> CoreResult<()> {
        let _guard = self.locks.acquire(tab_id).await;

        let stream_id = self.sessions.ensure_session(tab_id).await?;

        let request = CaptureRequest {
            stream_id,
            tab: tab_id,
            volume,
        };

        match self.backend.set_volume(request).await {
            Ok(reply) if reply.ok => {}
            Ok(_) => {
                self.discard_session(tab_id).await;
                return Err(VolumeError::BackendFailed {
                    reason: format!(
                        "Capture context could not apply {} to tab {}",
                        volume, tab_id
                    ),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            Err(e) => {
                self.discard_session(tab_id).await;
                return Err(e);
            }
        }

        self.sessions.record_gain(tab_id, volume.gain());
        self.persist(tab_id, volume).await;
        self.indicator.set_badge(tab_id, volume);

        info!(tab_id = %tab_id, %volume, gain = volume.gain(), "Volume applied");

        Ok(())
    }

    /// Release everything held for a tab that went away.
    #[instrument(skip(self))]
    pub async fn forget_tab(&self, tab_id: TabId) {
        {
            let _guard = self.locks.acquire(tab_id).await;
            self.discard_session(tab_id).await;
        }
        self.locks.forget(tab_id);
        debug!(tab_id = %tab_id, locked_tabs = self.locks.len(), "Tab forgotten");
    }

    async fn discard_session(&self, tab_id: TabId) {
        let Some(session) = self.sessions.teardown(tab_id) else {
            return;
        };

        if let Err(e) = self.backend.teardown(session.key()).await {
            debug!(tab_id = %tab_id, error = ?e, "Capture context teardown failed");
        }
    }

    async fn persist(&self, tab_id: TabId, volume: Volume) {
        let tab = match self.tabs.get(tab_id).await {
            Ok(tab) => tab,
            Err(e) => {
                debug!(tab_id = %tab_id, error = ?e, "Tab lookup failed, preference not saved");
                return;
            }
        };

        let Some(domain) = domain_of(&tab.url) else {
            debug!(tab_id = %tab_id, url = %tab.url, "No domain in URL, preference not saved");
            return;
        };

        if let Err(e) = self.preferences.set(&domain, volume).await {
            warn!(tab_id = %tab_id, domain = %domain, error = ?e, "Failed to save preference");
        }
    }
}
