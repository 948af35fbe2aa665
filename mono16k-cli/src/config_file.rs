//! Configuration file support
//!
//! Loads CLI configuration from TOML files. Every section and key is
//! optional; missing values keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::{CliConfig, LogFormat, DEFAULT_BATCH_SIZE};
use crate::error::Result;

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Audio settings
    pub audio: Option<AudioSettings>,
    /// Logging settings
    pub logging: Option<LoggingSettings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioSettings {
    /// Encoder bitrate in bps
    pub bit_rate: Option<u64>,
    /// Frame size for encoders without a fixed one
    pub frame_size: Option<usize>,
    /// Encoder name; guessed from the output extension when absent
    pub codec: Option<String>,
    /// Samples per write when transcoding
    pub batch_size: Option<usize>,
    /// Skip packets the decoder rejects
    pub skip_invalid_packets: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: Option<String>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| {
            crate::error::CliError::Config(format!("{}: {}", path.as_ref().display(), e))
        })
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| crate::error::CliError::Config(format!("Cannot serialize config: {}", e)))
    }

    /// Generate default configuration file
    pub fn default_config() -> Self {
        let defaults = CliConfig::default();
        Self {
            audio: Some(AudioSettings {
                bit_rate: Some(defaults.encoder.bit_rate),
                frame_size: Some(defaults.encoder.fallback_frame_size),
                codec: None,
                batch_size: Some(defaults.batch_size),
                skip_invalid_packets: Some(defaults.decoder.skip_invalid_packets),
            }),
            logging: Some(LoggingSettings {
                level: defaults.log_level,
                format: Some("pretty".to_string()),
            }),
        }
    }

    /// Convert to CliConfig
    pub fn into_cli_config(self) -> Result<CliConfig> {
        let mut config = CliConfig::default();

        if let Some(audio) = self.audio {
            if let Some(bit_rate) = audio.bit_rate {
                config.encoder.bit_rate = bit_rate;
            }
            if let Some(frame_size) = audio.frame_size {
                config.encoder.fallback_frame_size = frame_size;
            }
            config.encoder.codec = audio.codec;
            config.batch_size = audio.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
            if let Some(skip) = audio.skip_invalid_packets {
                config.decoder.skip_invalid_packets = skip;
            }
        }

        if let Some(logging) = self.logging {
            config.log_level = logging.level;
            config.log_format = match logging.format {
                Some(format) => format.parse::<LogFormat>()?,
                None => LogFormat::Pretty,
            };
        }

        config.validate()?;
        Ok(config)
    }
}

/// Load `path` if it exists.
///
/// Returns the defaults and a warning to log once logging is up when the
/// file is missing or invalid.
pub fn load_or_default(path: &Path) -> (CliConfig, Option<String>) {
    if !path.exists() {
        return (CliConfig::default(), None);
    }
    match ConfigFile::from_file(path).and_then(ConfigFile::into_cli_config) {
        Ok(config) => (config, None),
        Err(e) => (
            CliConfig::default(),
            Some(format!(
                "Failed to load config file {}: {}. Using defaults.",
                path.display(),
                e
            )),
        ),
    }
}
