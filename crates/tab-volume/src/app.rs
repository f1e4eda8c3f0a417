use crate::{
    AppResult,
    bridge::{BridgeEvent, BridgeOutput, BrowserBridge},
};

use tab_volume_core::{Coordinator, UiRequest};

use std::{ops::ControlFlow, sync::Arc};

use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};

/// Main application state.
///
/// Routes browser bridge events into the coordinator and writes replies
/// back. UI requests run in their own tasks so a slow capture never holds up
/// tab bookkeeping.
pub struct App {
    pub(crate) coordinator: Arc<Coordinator>,
    pub(crate) bridge: Arc<BrowserBridge>,
    pub(crate) events: mpsc::Receiver<BridgeEvent>,
    pub(crate) output: mpsc::UnboundedSender<BridgeOutput>,
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Tab-Volume starting");

        self.coordinator.start().await;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                event = self.events.recv() => {
                    let Some(event) = event else {
                        info!("Browser bridge closed, shutting down");
                        break;
                    };
                    if self.handle_event(event).await.is_break() {
                        info!("Shutdown requested");
                        break;
                    }
                }

                result = &mut ctrl_c => {
                    if let Err(e) = result {
                        error!(error = ?e, "Failed to listen for interrupt");
                    }
                    info!("Interrupted");
                    break;
                }
            }
        }

        self.coordinator.shutdown().await;
        info!("Tab-Volume shut down successfully");

        Ok(())
    }

    /// Apply one bridge event. Breaks on a shutdown request.
    #[instrument(skip(self))]
    pub(crate) async fn handle_event(&self, event: BridgeEvent) -> ControlFlow<()> {
        match event {
            BridgeEvent::Tabs { tabs } => {
                self.bridge.replace_tabs(tabs);
                self.coordinator.connector().broadcast_tab_list().await;
            }
            BridgeEvent::TabUpdated { tab, change } => {
                let tab_id = tab.id;
                self.bridge.upsert_tab(tab);
                self.coordinator.on_tab_updated(tab_id, &change).await;
            }
            BridgeEvent::TabRemoved { id } => {
                self.coordinator.on_tab_removed(id).await;
                self.bridge.remove_tab(id);
            }
            BridgeEvent::SetVolume {
                request_id,
                id,
                volume,
                sender_tab,
            } => {
                let coordinator = Arc::clone(&self.coordinator);
                let output = self.output.clone();
                tokio::spawn(async move {
                    let ok = coordinator
                        .handle_ui_request(UiRequest { id, volume }, sender_tab)
                        .await;
                    if output
                        .send(BridgeOutput::VolumeResult { request_id, ok })
                        .is_err()
                    {
                        warn!(request_id, "Bridge closed before volume result");
                    }
                });
            }
            BridgeEvent::GetPreferred { request_id, id } => {
                let coordinator = Arc::clone(&self.coordinator);
                let output = self.output.clone();
                tokio::spawn(async move {
                    let volume = coordinator.preferred_volume(id).await;
                    if output
                        .send(BridgeOutput::Preferred { request_id, volume })
                        .is_err()
                    {
                        warn!(request_id, "Bridge closed before preferred volume");
                    }
                });
            }
            BridgeEvent::Shutdown => return ControlFlow::Break(()),
        }

        ControlFlow::Continue(())
    }
}
