//! CLI configuration

use mono16k::{DecoderConfig, EncoderConfig};

use crate::error::{CliError, Result};

/// Samples per `write` call when transcoding (one second of output)
pub const DEFAULT_BATCH_SIZE: usize = 16_000;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines with source location
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(CliError::Config(format!(
                "unknown log format {:?} (expected pretty or json)",
                other
            ))),
        }
    }
}

/// Effective CLI configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Settings for encode sessions
    pub encoder: EncoderConfig,

    /// Settings for the decode pipeline
    pub decoder: DecoderConfig,

    /// Samples handed to each `write` call
    pub batch_size: usize,

    /// Default tracing filter (trace, debug, info, warn, error), used when
    /// `RUST_LOG` is not set
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            encoder: EncoderConfig::default(),
            decoder: DecoderConfig::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl CliConfig {
    pub fn validate(&self) -> Result<()> {
        self.encoder.validate()?;
        if self.batch_size == 0 {
            return Err(CliError::Config("batch_size must be positive".into()));
        }
        Ok(())
    }

    /// Tracing filter directive for this binary, the library and FFmpeg
    pub fn filter_directive(&self) -> String {
        format!("mono16k={0},ffmpeg={0}", self.log_level)
    }
}
