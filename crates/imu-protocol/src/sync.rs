//! Signature Scanner

use crate::{SIGNATURE, SIGNATURE_LEN};
use frame_buffer::FrameBuffer;

/// Locates packet start signatures inside a [`FrameBuffer`]
#[derive(Debug, Clone, Copy)]
pub struct FrameSynchronizer {
    signature: [u8; SIGNATURE_LEN],
}

impl Default for FrameSynchronizer {
    fn default() -> Self {
        Self::new(SIGNATURE)
    }
}

impl FrameSynchronizer {
    /// Create a scanner for a custom 4-byte signature
    pub fn new(signature: [u8; SIGNATURE_LEN]) -> Self {
        Self { signature }
    }

    /// Signature this scanner looks for
    pub fn signature(&self) -> [u8; SIGNATURE_LEN] {
        self.signature
    }

    /// Scan `capacity - 3` offsets from `pos` and return the first match
    ///
    /// Offsets are ring indices; the earliest match in scan order wins.
    pub fn find_start(&self, buffer: &FrameBuffer, pos: usize) -> Option<usize> {
        self.find_start_within(buffer, pos, buffer.capacity())
    }

    /// Scan only the first `len` bytes from `pos` (at most one ring)
    ///
    /// A candidate must have all four signature bytes inside the window, so
    /// `len - 3` offsets are tried.
    pub fn find_start_within(&self, buffer: &FrameBuffer, pos: usize, len: usize) -> Option<usize> {
        let capacity = buffer.capacity();
        let candidates = len.min(capacity).saturating_sub(SIGNATURE_LEN - 1);

        (0..candidates)
            .map(|i| (pos + i) % capacity)
            .find(|&start| self.matches_at(buffer, start))
    }

    #[inline]
    fn matches_at(&self, buffer: &FrameBuffer, start: usize) -> bool {
        self.signature
            .iter()
            .enumerate()
            .all(|(i, &expected)| buffer.byte_at(start + i) == expected)
    }
}
