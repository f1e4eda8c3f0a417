//! Visible extension indicator: connection icon, per-tab badge, error flash.

use crate::{CoreResult, TabId, Volume};

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use tracing::{debug, warn};

/// How long the error icon stays up during a flash.
pub const FLASH_DURATION: Duration = Duration::from_millis(300);

/// Quiet period after a flash during which further flashes are ignored.
pub const FLASH_COOLDOWN: Duration = Duration::from_millis(300);

/// Two-state extension icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionIcon {
    /// Native host unreachable, or an error is being flashed.
    Disconnected,
    /// Native host connected.
    Connected,
}

/// Sink for indicator changes, implemented by whatever owns the real icon.
pub trait Indicator: Send + Sync {
    /// Switch the extension icon.
    fn set_connection_state(&self, icon: ConnectionIcon) -> CoreResult<()>;

    /// Set the badge text for one tab; an empty string clears it.
    fn set_tab_badge(&self, tab_id: TabId, text: &str) -> CoreResult<()>;
}

/// Tracks the current connection icon and drives the transient error flash.
///
/// Indicator failures are logged and otherwise ignored.
pub struct StatusIndicator {
    indicator: Arc<dyn Indicator>,
    connection: Mutex<ConnectionIcon>,
    flashing: Arc<AtomicBool>,
}

impl StatusIndicator {
    /// Wrap an indicator sink. The icon starts out disconnected.
    pub fn new(indicator: Arc<dyn Indicator>) -> Arc<Self> {
        Arc::new(Self {
            indicator,
            connection: Mutex::new(ConnectionIcon::Disconnected),
            flashing: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Current connection icon, ignoring any flash in progress.
    pub fn connection(&self) -> ConnectionIcon {
        *self.connection.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether an error flash (including its cooldown) is running.
    pub fn is_flashing(&self) -> bool {
        self.flashing.load(Ordering::Acquire)
    }

    /// Record and display a connection icon.
    pub fn set_connection(&self, icon: ConnectionIcon) {
        *self.connection.lock().unwrap_or_else(|e| e.into_inner()) = icon;
        if let Err(e) = self.indicator.set_connection_state(icon) {
            warn!(error = ?e, ?icon, "Failed to set connection icon");
        }
    }

    /// Show a tab's volume on its badge.
    pub fn set_badge(&self, tab_id: TabId, volume: Volume) {
        if let Err(e) = self.indicator.set_tab_badge(tab_id, &volume.badge_text()) {
            warn!(tab_id = %tab_id, error = ?e, "Failed to set badge text");
        }
    }

    /// Briefly show the error icon, then restore the connection icon.
    ///
    /// Requests while a flash or its cooldown is running are dropped.
    pub fn flash_error(self: &Arc<Self>) {
        if self.flashing.swap(true, Ordering::AcqRel) {
            debug!("Error flash already in progress");
            return;
        }

        if let Err(e) = self
            .indicator
            .set_connection_state(ConnectionIcon::Disconnected)
        {
            warn!(error = ?e, "Failed to show error icon");
        }

        let this = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(FLASH_DURATION).await;

            let icon = this.connection();
            if let Err(e) = this.indicator.set_connection_state(icon) {
                warn!(error = ?e, ?icon, "Failed to restore icon after flash");
            }

            tokio::time::sleep(FLASH_COOLDOWN).await;
            this.flashing.store(false, Ordering::Release);
        });
    }
}
