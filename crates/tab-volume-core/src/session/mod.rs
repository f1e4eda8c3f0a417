mod registry;
mod session_key;
mod tab_capture;

pub use {
    registry::{Session, SessionRegistry},
    session_key::SessionKey,
    tab_capture::TabCapture,
};
