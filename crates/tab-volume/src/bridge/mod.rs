//! Line-delimited JSON bridge to the browser side.
//!
//! The browser side reports tabs and UI requests as [`BridgeEvent`]s on
//! stdin; everything the core wants shown or played goes back as
//! [`BridgeOutput`]s on stdout.

mod bridge_event;
mod bridge_output;
mod bridge_track;
mod browser_bridge;
pub(crate) mod stdio;

pub(crate) use {
    bridge_event::BridgeEvent,
    bridge_output::{BridgeOutput, IconState},
    bridge_track::BridgeTrack,
    browser_bridge::BrowserBridge,
};
