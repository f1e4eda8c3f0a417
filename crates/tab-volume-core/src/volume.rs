use crate::{CoreResult, VolumeError};

use std::{fmt, panic::Location};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// Tab volume as a percentage in `0..=100`.
///
/// The percentage is what users see and what gets persisted; the audio graph
/// consumes [`Volume::gain`], which squares the ratio so that the middle of a
/// slider sounds like the middle of the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Volume(u8);

impl Volume {
    /// Silence.
    pub const MUTED: Volume = Volume(0);
    /// Unattenuated playback, also the default for unknown domains.
    pub const FULL: Volume = Volume(100);

    /// Create a volume from a whole percentage.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::InvalidVolume`] above 100.
    #[track_caller]
    pub fn new(percent: u8) -> CoreResult<Self> {
        if percent > 100 {
            return Err(VolumeError::InvalidVolume {
                value: f64::from(percent),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(Self(percent))
    }

    /// Create a volume from a loosely typed number received over the wire.
    ///
    /// Values are rounded and clamped into range; only non-finite input is
    /// rejected.
    #[track_caller]
    pub fn from_wire(value: f64) -> CoreResult<Self> {
        if !value.is_finite() {
            return Err(VolumeError::InvalidVolume {
                value,
                location: ErrorLocation::from(Location::caller()),
            });
        }
        // Clamped to 0..=100 first, so the cast cannot truncate.
        Ok(Self(value.round().clamp(0.0, 100.0) as u8))
    }

    /// The percentage, `0..=100`.
    pub fn percent(self) -> u8 {
        self.0
    }

    /// Linear gain factor, `(percent / 100)^2`.
    pub fn gain(self) -> f32 {
        let ratio = f32::from(self.0) / 100.0;
        ratio * ratio
    }

    /// Text for the per-tab badge; empty at full volume.
    pub fn badge_text(self) -> String {
        if self == Self::FULL {
            String::new()
        } else {
            self.0.to_string()
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::FULL
    }
}

impl TryFrom<u8> for Volume {
    type Error = VolumeError;

    #[track_caller]
    fn try_from(percent: u8) -> CoreResult<Self> {
        Self::new(percent)
    }
}

impl From<Volume> for u8 {
    fn from(volume: Volume) -> Self {
        volume.0
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
