//! Packet Decoder

use crate::record::ImuRecord;
use crate::PACKET_SIZE;
use frame_buffer::FrameBuffer;

/// Decodes the packet that starts at a synchronized offset
///
/// Whatever 20 bytes follow a signature match are accepted: there is no
/// checksum in the protocol, so corruption that leaves the signature intact
/// goes undetected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PacketDecoder;

impl PacketDecoder {
    /// Create a decoder
    pub fn new() -> Self {
        Self
    }

    /// Extract the 20-byte window at `frame_start` (wrap-safe) and decode it
    pub fn decode(&self, buffer: &FrameBuffer, frame_start: usize) -> ImuRecord {
        let mut packet = [0u8; PACKET_SIZE];
        buffer.copy_window(frame_start, &mut packet);
        ImuRecord::from_packet(&packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{encode_packet, FrameSynchronizer};
    use frame_buffer::CursorMode;

    #[test]
    fn test_decode_at_offset() {
        let mut buffer = FrameBuffer::with_default_capacity(CursorMode::Shared);
        buffer.append(&[0x11; 10]);
        buffer.append(&encode_packet(42, 1.5, -2.25, 0.0));

        let start = FrameSynchronizer::default().find_start(&buffer, buffer.cursor());
        assert_eq!(start, Some(10));

        let record = PacketDecoder::new().decode(&buffer, 10);
        assert_eq!(record, ImuRecord::new(42, 1.5, -2.25, 0.0));
    }

    #[test]
    fn test_decode_across_wrap() {
        let mut buffer = FrameBuffer::new(64, CursorMode::Split);
        buffer.append(&[0u8; 54]);
        buffer.append(&encode_packet(0xDEAD_BEEF, -0.0, f32::MIN_POSITIVE, 3.25));

        let record = PacketDecoder::new().decode(&buffer, 54);
        assert_eq!(record.packet_count, 0xDEAD_BEEF);
        assert_eq!(record.x_rate.to_bits(), (-0.0f32).to_bits());
        assert_eq!(record.y_rate, f32::MIN_POSITIVE);
        assert_eq!(record.z_rate, 3.25);
    }

    #[test]
    fn test_decode_does_not_touch_cursor() {
        let mut buffer = FrameBuffer::new(64, CursorMode::Split);
        buffer.append(&encode_packet(1, 0.0, 0.0, 0.0));
        let _ = PacketDecoder::new().decode(&buffer, 0);

        assert_eq!(buffer.cursor(), 0);
        assert_eq!(buffer.unread(), 20);
    }
}
