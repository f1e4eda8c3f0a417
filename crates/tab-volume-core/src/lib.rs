//! Tab-Volume Core Library
//!
//! Per-tab volume control driven from a UI or from a native companion
//! process: a reconnecting native host connector, a session registry, and the
//! pipeline that drives an audio capture context across a request/reply
//! boundary.
//!
//! Browser-facing pieces (tabs, capture stream ids, media tracks, storage,
//! the icon) are traits implemented by the embedding process.
//!
//! # Example
//!
//! ```no_run
//! use tab_volume_core::{Coordinator, CoordinatorParts, TabId, UiRequest, host::ConnectorConfig};
//!
//! async fn run(parts: CoordinatorParts) {
//!     let coordinator = Coordinator::new(parts, ConnectorConfig::default());
//!     coordinator.start().await;
//!
//!     let request = UiRequest { id: TabId(7), volume: 50.0 };
//!     let applied = coordinator.handle_ui_request(request, None).await;
//!     println!("Applied: {}", applied);
//! }
//! ```

pub mod capture;
mod coordinator;
pub mod domain;
mod error;
pub mod host;
mod indicator;
mod pipeline;
mod preferences;
mod session;
mod tab;
mod volume;

pub use {
    coordinator::{Coordinator, CoordinatorParts, UiRequest},
    error::{Result as CoreResult, VolumeError},
    indicator::{ConnectionIcon, FLASH_COOLDOWN, FLASH_DURATION, Indicator, StatusIndicator},
    pipeline::VolumePipeline,
    preferences::{MemoryPreferenceStore, PreferenceStore},
    session::{Session, SessionKey, SessionRegistry, TabCapture},
    tab::{TabChange, TabId, TabInfo, Tabs},
    volume::Volume,
};
