//! Byte Sources

use crate::error::LinkError;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::time::Duration;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

/// Default baud rate of the IMU link
pub const DEFAULT_BAUD_RATE: u32 = 921_600;

/// Non-blocking supplier of raw stream bytes
pub trait ByteSource {
    /// Copy whatever is pending into `buf` without waiting
    ///
    /// `Ok(0)` means "nothing right now" and is not an error. An empty `buf`
    /// must also return `Ok(0)`.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_available(buf)
    }
}

/// Serial device configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path (e.g., "/dev/tty1" or "/dev/pts/2")
    pub device: String,
    /// Line speed
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: "/dev/tty1".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

/// Raw 8N1 serial port with no flow control, polled without blocking
pub struct SerialSource {
    port: Box<dyn SerialPort>,
}

impl SerialSource {
    /// Open and configure the serial device
    pub fn open(config: &SerialConfig) -> Result<Self, LinkError> {
        info!(
            "Opening serial device {} at {} baud",
            config.device, config.baud_rate
        );

        let mut port = tokio_serial::new(config.device.as_str(), config.baud_rate)
            .open()
            .map_err(|e| LinkError::DeviceOpen {
                device: config.device.clone(),
                reason: e.to_string(),
            })?;

        let configure = |port: &mut Box<dyn SerialPort>| -> Result<(), tokio_serial::Error> {
            port.set_data_bits(DataBits::Eight)?;
            port.set_parity(Parity::None)?;
            port.set_stop_bits(StopBits::One)?;
            port.set_flow_control(FlowControl::None)?;
            port.set_timeout(Duration::ZERO)?;
            Ok(())
        };
        configure(&mut port).map_err(|e| LinkError::DeviceConfig {
            device: config.device.clone(),
            reason: e.to_string(),
        })?;

        debug!("Serial device {} configured 8N1, raw", config.device);
        Ok(Self { port })
    }
}

impl ByteSource for SerialSource {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let pending = self.port.bytes_to_read().map_err(io::Error::from)? as usize;
        if pending == 0 || buf.is_empty() {
            return Ok(0);
        }

        let len = pending.min(buf.len());
        match self.port.read(&mut buf[..len]) {
            Ok(n) => Ok(n),
            Err(e) if is_idle(&e) => Ok(0),
            Err(e) => Err(e),
        }
    }
}

/// FIFO or regular file opened non-blocking (simulator replay)
pub struct FileSource {
    file: File,
}

impl FileSource {
    /// Open the path for non-blocking reads
    pub fn open(path: &str) -> Result<Self, LinkError> {
        info!("Opening {} as a non-blocking file source", path);

        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
            .map_err(|e| LinkError::DeviceOpen {
                device: path.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { file })
    }
}

impl ByteSource for FileSource {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.file.read(buf) {
            // EOF on a FIFO just means no writer right now
            Ok(n) => Ok(n),
            Err(e) if is_idle(&e) => Ok(0),
            Err(e) => Err(e),
        }
    }
}

fn is_idle(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}
