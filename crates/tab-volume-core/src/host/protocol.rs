//! Messages exchanged with the native host.
//!
//! Inbound messages are loosely shaped JSON objects. The marker that names a
//! message may sit under either `message` or `type`, depending on the host
//! version.

use crate::{CoreResult, TabId, TabInfo, Volume, VolumeError};

use std::panic::Location;

use error_location::ErrorLocation;
use serde::Deserialize;
use serde_json::{Value, json};

const READY_MARKER: &str = "allready";
const SET_VOLUME_MARKER: &str = "setvol";
const PING_MARKER: &str = "ping";

/// Which tabs a host volume command addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeTarget {
    /// Tabs whose title contains any filter, case-insensitively.
    TitleFilters(Vec<String>),
    /// A single tab by id (older hosts).
    Tab(TabId),
}

/// Decoded inbound host message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMessage {
    /// Host finished starting up.
    Ready,
    /// Host requests a volume change.
    SetVolume {
        /// Addressed tabs.
        target: VolumeTarget,
        /// Requested volume.
        volume: Volume,
    },
    /// Anything else; ignored.
    Unknown,
}

/// Fields of a `setvol` command; other keys on the message are ignored.
#[derive(Debug, Deserialize)]
struct RawSetVolume {
    #[serde(default, rename = "tabTargets")]
    tab_targets: Option<Vec<String>>,
    #[serde(default)]
    tab: Option<TabId>,
    #[serde(default)]
    volume: Option<f64>,
}

/// Whether `value` names `marker` under `type` or `message`.
fn has_marker(value: &Value, marker: &str) -> bool {
    ["type", "message"]
        .iter()
        .any(|key| value.get(key).and_then(Value::as_str) == Some(marker))
}

impl HostMessage {
    /// Decode an inbound message.
    ///
    /// Only the marker decides what a message is. Non-object payloads and
    /// unrecognised markers decode as [`HostMessage::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Protocol`] for a `setvol` command with
    /// missing or malformed fields.
    #[track_caller]
    pub fn decode(value: Value) -> CoreResult<Self> {
        if !value.is_object() {
            return Ok(Self::Unknown);
        }

        if has_marker(&value, READY_MARKER) {
            return Ok(Self::Ready);
        }

        if !has_marker(&value, SET_VOLUME_MARKER) {
            return Ok(Self::Unknown);
        }

        let raw: RawSetVolume =
            serde_json::from_value(value).map_err(|e| VolumeError::Protocol {
                reason: format!("Failed to decode setvol: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let target = match (raw.tab_targets, raw.tab) {
            (Some(filters), _) => VolumeTarget::TitleFilters(filters),
            (None, Some(tab_id)) => VolumeTarget::Tab(tab_id),
            (None, None) => {
                return Err(VolumeError::Protocol {
                    reason: "setvol without tabTargets or tab".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        let volume = raw.volume.ok_or_else(|| VolumeError::Protocol {
            reason: "setvol without volume".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self::SetVolume {
            target,
            volume: Volume::from_wire(volume)?,
        })
    }
}

/// Liveness probe sent right after connecting.
pub fn ping() -> Value {
    json!({ "message": PING_MARKER })
}

/// Host-facing tab listing: `[{id, title}, ...]` in browser order.
pub fn tab_list(tabs: &[TabInfo]) -> Value {
    Value::Array(
        tabs.iter()
            .map(|tab| json!({ "id": tab.id, "title": tab.title }))
            .collect(),
    )
}
