//! IMU Relay - Main Entry Point

use anyhow::Context;
use clap::Parser;
use frame_buffer::FrameBuffer;
use imu_link::{ByteSource, FileSource, LinkError, SerialSource, UdpBroadcastSink};
use imu_relay::{init_logging, Cadence, LogFormat, ProcessingLoop, RelayConfig, SourceKind};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Device path the IMU is wired to by default
const DEFAULT_DEVICE: &str = "/dev/tty1";

/// Relay IMU packets from a serial link to a UDP broadcast channel
#[derive(Debug, Parser)]
#[command(name = "imu-relay", version, about)]
struct Cli {
    /// Device path (defaults to /dev/tty1)
    device: Option<String>,

    /// Configuration file (TOML)
    #[arg(long, env = "IMU_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Read from a serial device or a FIFO/file
    #[arg(long, value_enum)]
    source: Option<SourceKind>,

    /// Broadcast UDP port
    #[arg(long)]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<RelayConfig> {
        let mut builder = RelayConfig::builder(self.config.as_deref())?;
        if let Some(device) = &self.device {
            builder = builder.set_override("source.device", device.as_str())?;
        }
        if let Some(kind) = self.source {
            let kind = match kind {
                SourceKind::Serial => "serial",
                SourceKind::File => "file",
            };
            builder = builder.set_override("source.kind", kind)?;
        }
        if let Some(port) = self.port {
            builder = builder.set_override("broadcast.port", i64::from(port))?;
        }
        if let Some(level) = &self.log_level {
            builder = builder.set_override("logging.level", level.as_str())?;
        }
        if let Some(format) = self.log_format {
            let format = match format {
                LogFormat::Text => "text",
                LogFormat::Json => "json",
            };
            builder = builder.set_override("logging.format", format)?;
        }
        Ok(RelayConfig::from_builder(builder)?)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config().context("Failed to load configuration")?;
    init_logging(config.logging.level_filter()?, config.logging.format);

    info!("=== IMU Relay v{} ===", env!("CARGO_PKG_VERSION"));
    if cli.device.is_some() {
        info!("Using custom device: {}", config.source.device);
    } else {
        info!("Using configured device: {}", config.source.device);
    }

    // Startup failures are reported through tracing only, then exit nonzero
    let source = match open_source(&config) {
        Ok(source) => source,
        Err(e) => {
            error!("{}", e);
            if config.source.device == DEFAULT_DEVICE {
                warn!("{} usually requires root privileges; try running with sudo", DEFAULT_DEVICE);
                warn!("For testing, pass a virtual port such as /dev/pts/2 (Linux) or /dev/ttys006 (macOS)");
            }
            std::process::exit(1);
        }
    };

    let sink = match UdpBroadcastSink::bind(&config.broadcast) {
        Ok(sink) => sink,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let buffer = FrameBuffer::new(config.framing.capacity, config.framing.cursor_mode);
    let mut relay = ProcessingLoop::new(source, sink, buffer, Cadence::new(config.cadence.period()));

    info!(
        "IMU relay started on {}, processing every {:?}",
        config.source.device,
        relay.cadence().period()
    );
    relay.run().await;

    Ok(())
}

fn open_source(config: &RelayConfig) -> Result<Box<dyn ByteSource>, LinkError> {
    let source: Box<dyn ByteSource> = match config.source.kind {
        SourceKind::Serial => Box::new(SerialSource::open(&config.source.serial())?),
        SourceKind::File => Box::new(FileSource::open(&config.source.device)?),
    };
    Ok(source)
}
