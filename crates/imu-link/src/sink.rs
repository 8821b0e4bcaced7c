//! Broadcast Sink

use crate::error::LinkError;
use serde::{Deserialize, Serialize};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use tracing::info;

/// Best-effort datagram publisher
pub trait DatagramSink {
    /// Send one datagram; no confirmation, no retry
    fn send_datagram(&mut self, payload: &[u8]) -> io::Result<()>;
}

impl<S: DatagramSink + ?Sized> DatagramSink for Box<S> {
    fn send_datagram(&mut self, payload: &[u8]) -> io::Result<()> {
        (**self).send_datagram(payload)
    }
}

/// Broadcast target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Broadcast address on the local segment
    pub address: String,
    /// Destination UDP port
    pub port: u16,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            address: "127.255.255.255".to_string(),
            port: 12345,
        }
    }
}

impl BroadcastConfig {
    /// Resolve the destination socket address
    pub fn target(&self) -> Result<SocketAddr, LinkError> {
        let ip: Ipv4Addr = self
            .address
            .parse()
            .map_err(|_| LinkError::InvalidAddress(self.address.clone()))?;
        Ok(SocketAddr::V4(SocketAddrV4::new(ip, self.port)))
    }
}

/// UDP socket with `SO_BROADCAST` enabled
pub struct UdpBroadcastSink {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpBroadcastSink {
    /// Create the socket and enable broadcast
    pub fn bind(config: &BroadcastConfig) -> Result<Self, LinkError> {
        let target = config.target()?;

        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(LinkError::TransportCreate)?;
        socket
            .set_broadcast(true)
            .map_err(LinkError::TransportConfig)?;

        info!("Broadcasting records to {}", target);
        Ok(Self { socket, target })
    }

    /// Destination address
    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl DatagramSink for UdpBroadcastSink {
    fn send_datagram(&mut self, payload: &[u8]) -> io::Result<()> {
        self.socket.send_to(payload, self.target).map(|_| ())
    }
}
