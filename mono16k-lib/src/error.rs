use thiserror::Error;

/// Main error type for decoding and encoding sessions
#[derive(Error, Debug)]
pub enum AudioError {
    /// An error originating from the underlying FFmpeg library
    #[error("FFmpeg error: {0}")]
    Ffmpeg(#[from] FfmpegError),

    /// A standard I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input container has no audio stream at all
    #[error("No audio stream found in {0}")]
    NoAudioStream(String),

    /// No output container format matches the requested path
    #[error("Could not guess an output format for {0}")]
    UnknownFormat(String),

    /// A path could not be handed to FFmpeg (for example it contains a NUL byte)
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// `write_data` or `close_output_file` was called with no open output
    #[error("No output file is open")]
    SessionNotOpen,

    /// `create_output_file` was called while another output is still open
    #[error("An output file is already open: {0}")]
    SessionAlreadyOpen(String),

    /// Invalid encoder or decoder configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// FFmpeg-specific errors
#[derive(Error, Debug)]
pub enum FfmpegError {
    /// Failure during global FFmpeg initialization
    #[error("FFmpeg initialization failed: {0}")]
    InitFailed(String),

    /// Failure opening an input media file
    #[error("Failed to open input file: {0}")]
    OpenInput(String),

    /// Failure locating stream information within a file
    #[error("Failed to find stream info: {0}")]
    FindStreamInfo(String),

    /// No decoder is registered for the codec of the selected stream
    #[error("Failed to find decoder: codec_id={0}")]
    DecoderNotFound(String),

    /// Failure instantiating or opening a decoder
    #[error("Failed to create decoder: {0}")]
    DecoderCreate(String),

    /// No encoder matches the output format or configured codec name
    #[error("Failed to find encoder: {0}")]
    EncoderNotFound(String),

    /// Failure instantiating or opening an encoder
    #[error("Failed to create encoder: {0}")]
    EncoderCreate(String),

    /// Failure creating an audio resampler
    #[error("Failed to create resampler: {0}")]
    ResamplerCreate(String),

    /// Failure converting samples through an opened resampler
    #[error("Resampling failed: {0}")]
    Resample(String),

    /// Failure creating the output container or opening its I/O sink
    #[error("Failed to create muxer: {0}")]
    MuxerCreate(String),

    /// Failure adding or configuring the output stream
    #[error("Stream configuration failed: {0}")]
    StreamConfig(String),

    /// Failure writing the container header
    #[error("Failed to write header: {0}")]
    WriteHeader(String),

    /// Failure writing a media packet to the container
    #[error("Failed to write packet: {0}")]
    WritePacket(String),

    /// Failure writing the container trailer
    #[error("Failed to write trailer: {0}")]
    WriteTrailer(String),

    /// Failure decoding a packet into frames
    #[error("Failed to decode packet: {0}")]
    DecodePacket(String),

    /// Failure encoding a frame into packets
    #[error("Failed to encode frame: {0}")]
    EncodeFrame(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffmpeg_error_wraps_into_audio_error() {
        let err: AudioError = FfmpegError::DecoderNotFound("AC3".into()).into();
        assert!(matches!(err, AudioError::Ffmpeg(FfmpegError::DecoderNotFound(_))));
        assert_eq!(
            err.to_string(),
            "FFmpeg error: Failed to find decoder: codec_id=AC3"
        );
    }

    #[test]
    fn test_session_errors_display() {
        assert_eq!(AudioError::SessionNotOpen.to_string(), "No output file is open");
        assert_eq!(
            AudioError::SessionAlreadyOpen("out.wav".into()).to_string(),
            "An output file is already open: out.wav"
        );
    }
}
