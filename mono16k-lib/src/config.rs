//! Encoder and decoder configuration

use serde::{Deserialize, Serialize};

use crate::error::{AudioError, Result};

/// Encoder frame size used when the encoder does not fix one (PCM codecs)
pub const DEFAULT_FRAME_SIZE: usize = 8000;
/// Default encoder bit rate in bps
pub const DEFAULT_BIT_RATE: u64 = 256_000;

/// Encode session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Target bit rate in bps (ignored by PCM encoders)
    pub bit_rate: u64,

    /// Samples per frame when the encoder reports no fixed frame size
    pub fallback_frame_size: usize,

    /// Encoder name (e.g. `"pcm_s16le"`, `"flac"`); guessed from the output
    /// path when unset
    pub codec: Option<String>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            bit_rate: DEFAULT_BIT_RATE,
            fallback_frame_size: DEFAULT_FRAME_SIZE,
            codec: None,
        }
    }
}

impl EncoderConfig {
    /// Use a named encoder instead of the one guessed from the output path
    pub fn with_codec(mut self, name: impl Into<String>) -> Self {
        self.codec = Some(name.into());
        self
    }

    /// Reject values FFmpeg would choke on later
    pub fn validate(&self) -> Result<()> {
        if self.bit_rate == 0 {
            return Err(AudioError::Config("bit_rate must be positive".into()));
        }
        if self.fallback_frame_size == 0 {
            return Err(AudioError::Config(
                "fallback_frame_size must be positive".into(),
            ));
        }
        if let Some(name) = &self.codec {
            if name.trim().is_empty() {
                return Err(AudioError::Config("codec name is empty".into()));
            }
        }
        Ok(())
    }
}

/// Decode pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Skip packets the decoder rejects instead of aborting the decode
    pub skip_invalid_packets: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            skip_invalid_packets: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_encoder_config() {
        let config = EncoderConfig::default();
        assert_eq!(config.bit_rate, 256_000);
        assert_eq!(config.fallback_frame_size, 8000);
        assert!(config.codec.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = EncoderConfig {
            bit_rate: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AudioError::Config(_))));

        let config = EncoderConfig {
            fallback_frame_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EncoderConfig::default().with_codec("  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: EncoderConfig = toml::from_str("codec = \"flac\"").unwrap();
        assert_eq!(config.codec.as_deref(), Some("flac"));
        assert_eq!(config.bit_rate, DEFAULT_BIT_RATE);

        let config: DecoderConfig = toml::from_str("").unwrap();
        assert!(config.skip_invalid_packets);
    }
}
