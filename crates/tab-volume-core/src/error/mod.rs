use crate::TabId;

use error_location::ErrorLocation;
use thiserror::Error;

/// Volume control errors with source location tracking.
#[derive(Error, Debug)]
pub enum VolumeError {
    /// Volume percentage outside 0-100 or not a number.
    #[error("Invalid volume: {value} {location}")]
    InvalidVolume {
        /// The rejected value as received.
        value: f64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The tab does not exist (closed, or never reported).
    #[error("Tab not found: {tab_id} {location}")]
    TabNotFound {
        /// Tab that was looked up.
        tab_id: TabId,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A capture stream id could not be obtained for the tab.
    #[error("Capture unavailable for tab {tab_id}: {reason} {location}")]
    CaptureUnavailable {
        /// Tab whose capture was requested.
        tab_id: TabId,
        /// Description of the capture failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture backend could not build or update the audio graph.
    #[error("Capture backend failed: {reason} {location}")]
    BackendFailed {
        /// Description of the backend failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture backend context is not running and could not be reached.
    #[error("Capture backend unreachable: {reason} {location}")]
    BackendUnreachable {
        /// Description of the delivery failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Opening or talking to the native host failed.
    #[error("Native host transport error: {reason} {location}")]
    Transport {
        /// Description of the transport failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A native host message could not be encoded or decoded.
    #[error("Protocol error: {reason} {location}")]
    Protocol {
        /// Description of the malformed message.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Reading or writing persisted volume preferences failed.
    #[error("Preference storage error: {reason} {location}")]
    Storage {
        /// Description of the storage failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`VolumeError`].
pub type Result<T> = std::result::Result<T, VolumeError>;
