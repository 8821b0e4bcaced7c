//! IMU Telemetry Relay
//!
//! Reads the unframed IMU byte stream, locates and decodes packets once per
//! cadence period, and republishes each record as a broadcast text line.

mod cadence;
mod processor;
mod settings;

pub use cadence::{Cadence, DEFAULT_PERIOD};
pub use processor::{CycleOutcome, LoopStats, ProcessingLoop, READ_CHUNK};
pub use settings::{
    CadenceConfig, ConfigError, FramingConfig, LogFormat, LoggingConfig, RelayConfig,
    SourceConfig, SourceKind,
};

use tracing::level_filters::LevelFilter;

/// Initialize logging
pub fn init_logging(level: LevelFilter, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(true);

    // A subscriber may already be installed (tests, embedding)
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
