use crate::ConnectionIcon;

/// Native host link state.
///
/// `Disconnected → Connecting → Connected → Ready`; any open state falls
/// back to `Disconnected` on disconnect or delivery failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No port open; a reconnect may be pending.
    #[default]
    Disconnected,
    /// A connect attempt is in flight.
    Connecting,
    /// Port open, waiting for the host's ready signal.
    Connected,
    /// Host signalled readiness; broadcasts may flow.
    Ready,
}

impl ConnectionState {
    /// Whether a port is open.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Connected | Self::Ready)
    }

    /// Icon shown for this state.
    pub fn icon(self) -> ConnectionIcon {
        if self.is_open() {
            ConnectionIcon::Connected
        } else {
            ConnectionIcon::Disconnected
        }
    }
}
