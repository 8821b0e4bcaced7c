//! Decoded IMU Records and Wire Encoding

use crate::error::ProtocolError;
use crate::{offset, PACKET_SIZE, SIGNATURE, SIGNATURE_LEN};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One decoded gyro sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImuRecord {
    /// Sender-side packet counter
    pub packet_count: u32,
    /// Angular rate about X (rad/s)
    pub x_rate: f32,
    /// Angular rate about Y (rad/s)
    pub y_rate: f32,
    /// Angular rate about Z (rad/s)
    pub z_rate: f32,
}

impl ImuRecord {
    /// Create a record from its fields
    pub fn new(packet_count: u32, x_rate: f32, y_rate: f32, z_rate: f32) -> Self {
        Self {
            packet_count,
            x_rate,
            y_rate,
            z_rate,
        }
    }

    /// Decode the payload of a whole packet without checking the signature
    ///
    /// Floats keep their exact bit pattern; no range checks are applied.
    pub fn from_packet(packet: &[u8; PACKET_SIZE]) -> Self {
        Self {
            packet_count: be_u32(packet, offset::COUNT),
            x_rate: f32::from_bits(be_u32(packet, offset::X_RATE)),
            y_rate: f32::from_bits(be_u32(packet, offset::Y_RATE)),
            z_rate: f32::from_bits(be_u32(packet, offset::Z_RATE)),
        }
    }

    /// Decode a packet from the front of a linear slice
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let packet: &[u8; PACKET_SIZE] = bytes
            .get(..PACKET_SIZE)
            .and_then(|head| head.try_into().ok())
            .ok_or(ProtocolError::TooShort {
                expected: PACKET_SIZE,
                actual: bytes.len(),
            })?;

        if packet[..SIGNATURE_LEN] != SIGNATURE {
            let mut found = [0u8; SIGNATURE_LEN];
            found.copy_from_slice(&packet[..SIGNATURE_LEN]);
            return Err(ProtocolError::BadSignature(found));
        }

        Ok(Self::from_packet(packet))
    }

    /// Encode into the 20-byte wire layout
    pub fn to_bytes(&self) -> [u8; PACKET_SIZE] {
        let mut packet = [0u8; PACKET_SIZE];
        packet[..SIGNATURE_LEN].copy_from_slice(&SIGNATURE);
        packet[offset::COUNT..offset::X_RATE].copy_from_slice(&self.packet_count.to_be_bytes());
        packet[offset::X_RATE..offset::Y_RATE].copy_from_slice(&self.x_rate.to_be_bytes());
        packet[offset::Y_RATE..offset::Z_RATE].copy_from_slice(&self.y_rate.to_be_bytes());
        packet[offset::Z_RATE..PACKET_SIZE].copy_from_slice(&self.z_rate.to_be_bytes());
        packet
    }

    /// Text line published as one broadcast datagram
    pub fn datagram_line(&self) -> String {
        format!("{}\n", self)
    }
}

impl fmt::Display for ImuRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IMU_DATA: Count={}, X={}, Y={}, Z={}",
            self.packet_count,
            Rate(self.x_rate),
            Rate(self.y_rate),
            Rate(self.z_rate)
        )
    }
}

/// Six-decimal fixed formatting, spelling non-finite values like printf
struct Rate(f32);

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v.is_nan() {
            f.write_str(if v.is_sign_negative() { "-nan" } else { "nan" })
        } else if v.is_infinite() {
            f.write_str(if v < 0.0 { "-inf" } else { "inf" })
        } else {
            write!(f, "{:.6}", v)
        }
    }
}

/// Build a wire packet from raw field values
pub fn encode_packet(packet_count: u32, x_rate: f32, y_rate: f32, z_rate: f32) -> [u8; PACKET_SIZE] {
    ImuRecord::new(packet_count, x_rate, y_rate, z_rate).to_bytes()
}

#[inline]
fn be_u32(bytes: &[u8; PACKET_SIZE], at: usize) -> u32 {
    u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
