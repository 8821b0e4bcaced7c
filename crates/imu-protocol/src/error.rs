//! Protocol Error Types

use thiserror::Error;

/// Errors when decoding a packet from a linear byte slice
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Not enough bytes for a whole packet
    #[error("Packet too short: expected {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// Leading bytes are not the start signature
    #[error("Bad start signature: {0:02X?}")]
    BadSignature([u8; 4]),
}
