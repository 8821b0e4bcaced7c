//! Link Error Types

use thiserror::Error;

/// Startup failures of the device or the broadcast transport
///
/// Once both ends are open nothing in this crate is fatal; read and send
/// failures surface as plain `io::Error` and are absorbed by the caller.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Device could not be opened
    #[error("Failed to open device {device}: {reason}")]
    DeviceOpen { device: String, reason: String },

    /// Device opened but could not be configured
    #[error("Failed to configure device {device}: {reason}")]
    DeviceConfig { device: String, reason: String },

    /// Socket could not be created
    #[error("Failed to create broadcast socket: {0}")]
    TransportCreate(#[source] std::io::Error),

    /// Socket created but broadcast could not be enabled
    #[error("Failed to enable broadcast: {0}")]
    TransportConfig(#[source] std::io::Error),

    /// Broadcast address does not parse as IPv4
    #[error("Invalid broadcast address: {0}")]
    InvalidAddress(String),
}
