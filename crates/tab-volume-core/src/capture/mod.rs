//! Audio capture graphs and the context that owns them.
//!
//! Volume requests cross into the capture context as [`CaptureRequest`]s; the
//! context keeps one [`GainNode`] per captured stream.

mod backend;
mod graph;
mod media;
mod offscreen;

pub use {
    backend::{CaptureBackend, CaptureReply, CaptureRequest},
    graph::{CaptureGraph, GainNode, GraphRegistry},
    media::{MediaDevices, MediaTrack},
    offscreen::OffscreenBackend,
};
