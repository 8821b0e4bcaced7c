//! IMU Link Adapters
//!
//! Narrow capabilities consumed by the relay loop: a non-blocking
//! [`ByteSource`] for the incoming stream and a best-effort
//! [`DatagramSink`] for publishing decoded records.

mod error;
pub mod mock;
mod sink;
mod source;

pub use error::LinkError;
pub use sink::{BroadcastConfig, DatagramSink, UdpBroadcastSink};
pub use source::{ByteSource, FileSource, SerialConfig, SerialSource};
