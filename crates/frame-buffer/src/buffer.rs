//! Byte Ring Implementation

use crate::{CursorMode, DEFAULT_CAPACITY};

/// Fixed-capacity circular byte store
///
/// All indices handed out or accepted by this type are ring indices in
/// `0..capacity`; anything larger is reduced modulo the capacity.
pub struct FrameBuffer {
    /// Pre-allocated storage
    storage: Box<[u8]>,
    /// Capacity of the ring
    capacity: usize,
    /// Cursor bookkeeping policy
    mode: CursorMode,
    /// Ring index where the next synchronization scan starts
    cursor: usize,
    /// Total bytes ever appended
    written: u64,
    /// Value of `written` that corresponds to the cursor (split mode only)
    consumed: u64,
    /// Bytes before this mark hold no frame start (split mode only)
    scanned: u64,
    /// Unread bytes lost to overwrite (split mode only)
    overrun_bytes: u64,
}

impl FrameBuffer {
    /// Create a zero-filled ring with the given capacity
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, mode: CursorMode) -> Self {
        assert!(capacity > 0, "Frame buffer capacity must be > 0");
        Self {
            storage: vec![0u8; capacity].into_boxed_slice(),
            capacity,
            mode,
            cursor: 0,
            written: 0,
            consumed: 0,
            scanned: 0,
            overrun_bytes: 0,
        }
    }

    /// Create a ring with the default capacity (4096 bytes)
    pub fn with_default_capacity(mode: CursorMode) -> Self {
        Self::new(DEFAULT_CAPACITY, mode)
    }

    /// Append bytes in order, wrapping at the end of the ring
    ///
    /// Returns the number of unscanned bytes that were overwritten by this
    /// call. Bytes already scanned without a frame start are not counted.
    /// Shared mode has no notion of unread bytes and always reports zero.
    pub fn append(&mut self, bytes: &[u8]) -> u64 {
        match self.mode {
            CursorMode::Shared => {
                for &byte in bytes {
                    self.storage[self.cursor] = byte;
                    self.cursor = (self.cursor + 1) % self.capacity;
                }
                self.written += bytes.len() as u64;
                0
            }
            CursorMode::Split => {
                for &byte in bytes {
                    let idx = (self.written % self.capacity as u64) as usize;
                    self.storage[idx] = byte;
                    self.written += 1;
                }

                let cap = self.capacity as u64;
                if self.written - self.consumed <= cap {
                    return 0;
                }

                // Oldest unread bytes are gone; restart from the oldest retained one
                let retained = self.written - cap;
                let lost = retained.saturating_sub(self.scanned);
                self.consumed = retained;
                self.scanned = self.scanned.max(retained);
                self.cursor = (self.consumed % cap) as usize;
                self.overrun_bytes += lost;
                lost
            }
        }
    }

    /// Read a single byte at a (wrapped) ring index
    #[inline]
    pub fn byte_at(&self, offset: usize) -> u8 {
        self.storage[offset % self.capacity]
    }

    /// Copy `out.len()` bytes starting at `offset`, wrapping as needed
    pub fn copy_window(&self, offset: usize, out: &mut [u8]) {
        let start = offset % self.capacity;
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.storage[(start + i) % self.capacity];
        }
    }

    /// Read `len` bytes starting at `offset`, wrapping as needed
    pub fn read_window(&self, offset: usize, len: usize) -> Vec<u8> {
        let mut window = vec![0u8; len];
        self.copy_window(offset, &mut window);
        window
    }

    /// Ring index where the next scan starts
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Forward distance from the cursor to a ring index
    pub fn distance_from_cursor(&self, index: usize) -> usize {
        (index % self.capacity + self.capacity - self.cursor) % self.capacity
    }

    /// Move the cursor forward by `count` bytes
    ///
    /// In split mode the cursor never passes the write position.
    pub fn advance(&mut self, count: usize) {
        match self.mode {
            CursorMode::Shared => {
                self.cursor = (self.cursor + count) % self.capacity;
            }
            CursorMode::Split => {
                self.consumed = (self.consumed + count as u64).min(self.written);
                self.scanned = self.scanned.max(self.consumed);
                self.cursor = (self.consumed % self.capacity as u64) as usize;
            }
        }
    }

    /// Record that the first `count` bytes from the cursor hold no frame start
    ///
    /// The cursor stays put. Overwriting these bytes later is not reported as
    /// loss. No-op in shared mode.
    pub fn mark_scanned(&mut self, count: usize) {
        if self.mode == CursorMode::Split {
            let mark = (self.consumed + count as u64).min(self.written);
            self.scanned = self.scanned.max(mark);
        }
    }

    /// Move the cursor forward to a ring index (less than one full ring away)
    pub fn consume_to(&mut self, index: usize) {
        let distance = self.distance_from_cursor(index);
        self.advance(distance);
    }

    /// Bytes a scan starting at the cursor may look at
    ///
    /// Shared mode always scans the whole ring.
    pub fn unread(&self) -> usize {
        match self.mode {
            CursorMode::Shared => self.capacity,
            CursorMode::Split => {
                (self.written - self.consumed).min(self.capacity as u64) as usize
            }
        }
    }

    /// Get the ring capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the cursor policy
    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    /// Get total bytes appended (for statistics)
    pub fn total_written(&self) -> u64 {
        self.written
    }

    /// Get total unread bytes lost to overwrite (split mode)
    pub fn overrun_bytes(&self) -> u64 {
        self.overrun_bytes
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("capacity", &self.capacity)
            .field("mode", &self.mode)
            .field("cursor", &self.cursor)
            .field("written", &self.written)
            .field("consumed", &self.consumed)
            .field("scanned", &self.scanned)
            .field("overrun_bytes", &self.overrun_bytes)
            .finish()
    }
}
