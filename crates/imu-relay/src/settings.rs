//! Relay configuration
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file, then `IMU_RELAY__*` environment variables, then command-line
//! overrides applied by the binary.

use clap::ValueEnum;
use frame_buffer::{CursorMode, DEFAULT_CAPACITY};
use imu_link::{BroadcastConfig, SerialConfig};
use imu_protocol::PACKET_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

/// Default config file stem searched in the working directory
pub const DEFAULT_CONFIG_NAME: &str = "imu-relay";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "IMU_RELAY";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Sources could not be read or merged
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where stream bytes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Serial device (tty)
    #[default]
    Serial,
    /// FIFO or regular file, read non-blocking
    File,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Kind of device behind `device`
    pub kind: SourceKind,
    /// Device or file path
    pub device: String,
    /// Serial line speed (ignored for files)
    pub baud_rate: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        let serial = SerialConfig::default();
        Self {
            kind: SourceKind::Serial,
            device: serial.device,
            baud_rate: serial.baud_rate,
        }
    }
}

impl SourceConfig {
    /// Serial settings for this source
    pub fn serial(&self) -> SerialConfig {
        SerialConfig {
            device: self.device.clone(),
            baud_rate: self.baud_rate,
        }
    }
}

/// Frame accumulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Ring capacity in bytes
    pub capacity: usize,
    /// Cursor bookkeeping policy
    pub cursor_mode: CursorMode,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            cursor_mode: CursorMode::default(),
        }
    }
}

/// Cycle timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CadenceConfig {
    /// Target period between cycle starts (milliseconds)
    pub period_ms: u64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self { period_ms: 80 }
    }
}

impl CadenceConfig {
    /// Period as a duration
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// Logging setup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Maximum level (error, warn, info, debug, trace, off)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    /// Parsed level filter
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.level)
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.level)))
    }
}

/// Complete relay configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub source: SourceConfig,
    pub broadcast: BroadcastConfig,
    pub framing: FramingConfig,
    pub cadence: CadenceConfig,
    pub logging: LoggingConfig,
}

impl RelayConfig {
    /// Start a layered builder seeded with defaults, a file and the environment
    ///
    /// With no explicit path, `imu-relay.{toml,json,...}` in the working
    /// directory is used if present.
    pub fn builder(
        path: Option<&Path>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let defaults = config::Config::try_from(&RelayConfig::default())?;

        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        Ok(config::Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            ))
    }

    /// Build, deserialize and validate
    pub fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config: RelayConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load with defaults, optional file and environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_builder(Self::builder(path)?)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.device.trim().is_empty() {
            return Err(ConfigError::Invalid("source.device is empty".to_string()));
        }
        if self.framing.capacity < PACKET_SIZE {
            return Err(ConfigError::Invalid(format!(
                "framing.capacity {} is smaller than one packet ({} bytes)",
                self.framing.capacity, PACKET_SIZE
            )));
        }
        if self.cadence.period_ms == 0 {
            return Err(ConfigError::Invalid("cadence.period_ms must be > 0".to_string()));
        }
        self.logging.level_filter()?;
        Ok(())
    }
}
