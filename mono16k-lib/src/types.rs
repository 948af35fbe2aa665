use serde::Serialize;

use crate::pcm;

/// Result of decoding the first audio stream of a file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedAudio {
    /// Normalized mono 16 kHz samples in [-1, 1]
    pub samples: Vec<f64>,
    /// Index of the decoded stream in the source container
    pub stream_index: usize,
    /// Name of the source codec, e.g. `"aac"`
    pub source_codec: String,
    /// Sample rate the decoder reported
    pub source_rate: u32,
    /// Channel count the decoder reported
    pub source_channels: u16,
    /// Why decoding stopped before the end of the stream, if it did
    pub aborted: Option<String>,
}

impl DecodedAudio {
    /// Number of decoded samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration of the decoded audio in seconds
    pub fn duration_secs(&self) -> f64 {
        pcm::duration_secs(self.samples.len())
    }

    /// Whether the whole stream was decoded
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }

    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

/// Container-level description of a media file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaInfo {
    /// Short name of the detected container format
    pub format: String,
    pub duration_secs: Option<f64>,
    pub file_size: u64,
    pub streams: Vec<StreamInfo>,
    /// The stream `decode_file` would decode
    pub selected_audio_stream: Option<usize>,
}

impl MediaInfo {
    pub fn audio_streams(&self) -> impl Iterator<Item = &StreamInfo> {
        self.streams.iter().filter(|s| s.medium == "audio")
    }
}

/// One stream of a probed file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamInfo {
    pub index: usize,
    /// `"audio"`, `"video"`, `"subtitle"`, ...
    pub medium: String,
    pub codec: String,
    /// Whether this FFmpeg build can decode the stream
    pub decodable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channels: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<u64>,
}
