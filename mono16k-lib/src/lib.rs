pub(crate) mod api;
pub mod config;
pub(crate) mod error;
pub(crate) mod ffmpeg_utils;
pub mod pcm;
pub(crate) mod session;
pub(crate) mod transcode;
pub(crate) mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use api::*;
pub use config::{DecoderConfig, EncoderConfig};
pub use error::{AudioError, FfmpegError, Result};
pub use ffmpeg_utils::version_info as ffmpeg_version_info;
pub use ffmpeg_utils::{init, install_log_filter};
pub use session::{EncodeSession, EncodeSummary};
pub use types::{DecodedAudio, MediaInfo, StreamInfo};
