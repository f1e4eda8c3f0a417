//! Native host link and its reconnecting connector.

mod backoff;
mod connection_state;
mod connector;
mod connector_config;
pub mod framing;
mod protocol;
mod transport;

pub use {
    backoff::Backoff,
    connection_state::ConnectionState,
    connector::NativeHostConnector,
    connector_config::{
        ConnectorConfig, DEFAULT_HOST_NAME, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF,
    },
    protocol::{HostMessage, VolumeTarget, ping, tab_list},
    transport::{HOST_PORT_QUEUE, HostPort, NativeTransport, PortPeer},
};
