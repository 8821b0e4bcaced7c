//! IMU Telemetry Protocol
//!
//! Wire format and framing for the fixed-size gyro packets emitted by the
//! IMU over its serial link. The stream carries no framing or checksum; a
//! packet is recognised only by its 4-byte start signature.
//!
//! Packet layout (all multi-byte fields big-endian):
//!
//! | Offset | Size | Field                  |
//! |--------|------|------------------------|
//! | 0      | 4    | Signature `7F F0 1C AF` |
//! | 4      | 4    | Packet count (u32)     |
//! | 8      | 4    | X rate (f32, rad/s)    |
//! | 12     | 4    | Y rate (f32, rad/s)    |
//! | 16     | 4    | Z rate (f32, rad/s)    |

mod decoder;
mod error;
mod record;
mod sync;

pub use decoder::PacketDecoder;
pub use error::ProtocolError;
pub use record::{encode_packet, ImuRecord};
pub use sync::FrameSynchronizer;

/// Start-of-frame signature
pub const SIGNATURE: [u8; 4] = [0x7F, 0xF0, 0x1C, 0xAF];

/// Length of the start signature
pub const SIGNATURE_LEN: usize = SIGNATURE.len();

/// Total packet length including the signature
pub const PACKET_SIZE: usize = 20;

/// Byte offsets of the payload fields
pub mod offset {
    /// Packet counter
    pub const COUNT: usize = 4;
    /// X angular rate
    pub const X_RATE: usize = 8;
    /// Y angular rate
    pub const Y_RATE: usize = 12;
    /// Z angular rate
    pub const Z_RATE: usize = 16;
}
