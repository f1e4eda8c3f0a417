use crate::CoreResult;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

/// Messages buffered in each direction of a port.
pub const HOST_PORT_QUEUE: usize = 64;

/// The connector's end of an open native host connection.
///
/// Closing `inbound` (all senders dropped) signals a disconnect from the
/// host side; dropping `outbound` tells the transport to close the link.
#[derive(Debug)]
pub struct HostPort {
    /// Messages to the host.
    pub outbound: mpsc::Sender<Value>,
    /// Messages from the host, in arrival order.
    pub inbound: mpsc::Receiver<Value>,
}

/// The transport's end of a [`HostPort`].
#[derive(Debug)]
pub struct PortPeer {
    /// Messages the connector posted for the host.
    pub outbound: mpsc::Receiver<Value>,
    /// Deliver host messages to the connector.
    pub inbound: mpsc::Sender<Value>,
}

impl HostPort {
    /// Create a connected port/peer pair.
    pub fn pair() -> (HostPort, PortPeer) {
        let (outbound_tx, outbound_rx) = mpsc::channel(HOST_PORT_QUEUE);
        let (inbound_tx, inbound_rx) = mpsc::channel(HOST_PORT_QUEUE);

        (
            HostPort {
                outbound: outbound_tx,
                inbound: inbound_rx,
            },
            PortPeer {
                outbound: outbound_rx,
                inbound: inbound_tx,
            },
        )
    }
}

/// Opens connections to a named native host.
#[async_trait]
pub trait NativeTransport: Send + Sync {
    /// Open a connection to `host_name`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::VolumeError::Transport`] when the host cannot be
    /// started or reached.
    async fn connect(&self, host_name: &str) -> CoreResult<HostPort>;
}
