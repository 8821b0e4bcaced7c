//! Circular Frame Buffer
//!
//! Fixed-capacity byte ring used to accumulate an unframed serial stream
//! until a complete packet can be located and decoded.

mod buffer;

pub use buffer::FrameBuffer;

use serde::{Deserialize, Serialize};

/// Default ring capacity in bytes
pub const DEFAULT_CAPACITY: usize = 4096;

/// How the write position and the search cursor relate to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorMode {
    /// One index serves as both the insertion point and the search start.
    ///
    /// Appends move the cursor, and consuming a frame moves the insertion
    /// point with it. Every scan covers the whole ring.
    Shared,
    /// Insertion point and search cursor are tracked separately.
    ///
    /// Scans only cover bytes appended since the cursor, and bytes lost to
    /// overwrite before being scanned are counted.
    #[default]
    Split,
}
