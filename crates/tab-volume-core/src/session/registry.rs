use crate::{CoreResult, SessionKey, TabCapture, TabId};

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use tracing::{debug, info, instrument};

/// One tab's active audio capture as seen from the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    key: SessionKey,
    gain: Option<f32>,
}

impl Session {
    fn new(key: SessionKey) -> Self {
        Self { key, gain: None }
    }

    /// Capture stream id of this session.
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Last gain the capture context confirmed, if any.
    pub fn gain(&self) -> Option<f32> {
        self.gain
    }
}

/// Maps tabs to their capture sessions.
///
/// Stream ids are acquired once per tab and reused until the session is torn
/// down, so repeated volume changes never re-request capture.
pub struct SessionRegistry {
    capture: Arc<dyn TabCapture>,
    sessions: Mutex<HashMap<TabId, Session>>,
}

impl SessionRegistry {
    /// Create an empty registry that acquires stream ids through `capture`.
    pub fn new(capture: Arc<dyn TabCapture>) -> Self {
        Self {
            capture,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Session key for a tab, acquiring a capture stream id if needed.
    ///
    /// If two callers race on the first acquisition, the first key stored
    /// wins and both get it back.
    #[instrument(skip(self))]
    pub async fn ensure_session(&self, tab_id: TabId) -> CoreResult<SessionKey> {
        let existing = self.lock().get(&tab_id).map(|session| session.key.clone());
        if let Some(key) = existing {
            return Ok(key);
        }

        let key = self.capture.media_stream_id(tab_id).await?;

        let mut sessions = self.lock();
        let session = sessions
            .entry(tab_id)
            .or_insert_with(|| Session::new(key.clone()));

        if session.key == key {
            info!(tab_id = %tab_id, session = %key, "Capture session created");
        } else {
            debug!(tab_id = %tab_id, "Lost acquisition race, reusing existing session");
        }

        Ok(session.key.clone())
    }

    /// Cache the gain last applied to a tab's session.
    pub fn record_gain(&self, tab_id: TabId, gain: f32) {
        if let Some(session) = self.lock().get_mut(&tab_id) {
            session.gain = Some(gain);
        }
    }

    /// Forget a tab's session, returning it so the caller can release the
    /// graph behind it.
    pub fn teardown(&self, tab_id: TabId) -> Option<Session> {
        let removed = self.lock().remove(&tab_id);
        if removed.is_some() {
            info!(tab_id = %tab_id, "Capture session removed");
        }
        removed
    }

    /// Forget every session.
    pub fn teardown_all(&self) -> Vec<Session> {
        self.lock().drain().map(|(_, session)| session).collect()
    }

    /// Snapshot of a tab's session.
    pub fn session(&self, tab_id: TabId) -> Option<Session> {
        self.lock().get(&tab_id).cloned()
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no session is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TabId, Session>> {
        // Entries are plain data; a panic mid-update cannot leave one torn.
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}
