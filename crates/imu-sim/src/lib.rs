//! IMU Packet Simulator
//!
//! Produces the same 20-byte packets as the real sensor, with slow
//! sinusoidal gyro rates and an incrementing counter.

use imu_protocol::{ImuRecord, PACKET_SIZE};
use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Default output path
pub const DEFAULT_OUTPUT: &str = "/tmp/imu_data";

/// Default transmission rate (Hz)
pub const DEFAULT_FREQUENCY_HZ: f64 = 12.5;

/// Sinusoidal sample generator
#[derive(Debug, Default)]
pub struct PacketGenerator {
    packet_count: u32,
}

impl PacketGenerator {
    /// Create a generator starting at count 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Rates for time `t` in seconds
    pub fn rates(t: f64) -> (f32, f32, f32) {
        (
            (10.0 * (t * 0.5).sin()) as f32,
            (5.0 * (t * 0.3).cos()) as f32,
            (2.0 * (t * 0.7).sin()) as f32,
        )
    }

    /// Next record; the counter wraps at `u32::MAX`
    pub fn next_record(&mut self, t: f64) -> ImuRecord {
        let (x, y, z) = Self::rates(t);
        let record = ImuRecord::new(self.packet_count, x, y, z);
        self.packet_count = self.packet_count.wrapping_add(1);
        record
    }

    /// Next encoded packet
    pub fn next_packet(&mut self, t: f64) -> [u8; PACKET_SIZE] {
        self.next_record(t).to_bytes()
    }

    /// Packets produced so far
    pub fn packet_count(&self) -> u32 {
        self.packet_count
    }
}

/// Replace `path` with a named pipe
pub fn create_fifo(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    // SAFETY: c_path is a valid NUL-terminated string for the duration of the call
    let ret = unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) };
    if ret != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::FileTypeExt;

    #[test]
    fn test_counter_increments() {
        let mut generator = PacketGenerator::new();
        let first = generator.next_record(0.0);
        let second = generator.next_record(0.08);

        assert_eq!(first.packet_count, 0);
        assert_eq!(second.packet_count, 1);
        assert_eq!(generator.packet_count(), 2);
    }

    #[test]
    fn test_rates_at_origin() {
        let (x, y, z) = PacketGenerator::rates(0.0);
        assert_eq!(x, 0.0);
        assert_eq!(y, 5.0);
        assert_eq!(z, 0.0);
    }

    #[test]
    fn test_packet_decodes() {
        let mut generator = PacketGenerator::new();
        let packet = generator.next_packet(1.0);
        let record = ImuRecord::from_bytes(&packet).unwrap();

        assert_eq!(record.packet_count, 0);
        assert_eq!(record.x_rate, (10.0 * 0.5f64.sin()) as f32);
    }

    #[test]
    fn test_create_fifo() {
        let path = std::env::temp_dir().join(format!("imu-sim-fifo-{}", std::process::id()));
        std::fs::write(&path, b"stale").unwrap();

        create_fifo(&path).unwrap();
        let file_type = std::fs::metadata(&path).unwrap().file_type();
        assert!(file_type.is_fifo());

        std::fs::remove_file(&path).unwrap();
    }
}
