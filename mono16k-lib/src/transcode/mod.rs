//! Audio transcoding module
//!
//! - Audio decoder initialization from source streams
//! - Resampling to 16 kHz mono S16, and from S16 to an encoder's format
//! - Encoder initialization for the output container
//! - The decode loop that turns packets into normalized samples

pub mod decoder;
pub mod encoder;
pub mod pipeline;
pub mod resampler;

use ffmpeg_next as ffmpeg;

use crate::error::Result;

/// Packet-in, frame-out side of a decoder.
///
/// Implemented by [`decoder::AudioDecoder`]; the decode loop is written
/// against this so it can be driven by scripted decoders in tests.
pub trait FrameSource {
    /// Feed one compressed packet.
    fn send_packet(&mut self, packet: &ffmpeg::codec::packet::Packet) -> Result<()>;

    /// Signal end of input so buffered frames can be drained.
    fn send_eof(&mut self) -> Result<()>;

    /// Next decoded frame, or `None` when the decoder needs more input or is
    /// finished.
    fn receive_frame(&mut self) -> Result<Option<ffmpeg::util::frame::Audio>>;
}

/// Frame-in, S16-out side of the resampler.
pub trait PcmConverter {
    /// Convert one decoded frame to mono 16 kHz S16 samples.
    fn convert(&mut self, frame: &mut ffmpeg::util::frame::Audio) -> Result<Vec<i16>>;

    /// Emit whatever the converter still buffers.
    fn flush(&mut self) -> Result<Vec<i16>>;
}

/// Frame-in, packet-out side of an encoder.
///
/// Implemented by [`encoder::AudioEncoder`]; the encode session drives its
/// encoder through this.
pub trait PacketEncoder {
    /// Send one PCM frame.
    fn send_frame(&mut self, frame: &ffmpeg::util::frame::Audio) -> Result<()>;

    /// Signal end of input so buffered packets can be drained.
    fn send_eof(&mut self) -> Result<()>;

    /// Next encoded packet, or `None` when the encoder needs more input or is
    /// finished.
    fn receive_packet(&mut self) -> Result<Option<ffmpeg::codec::packet::Packet>>;

    /// Samples per frame.
    fn frame_size(&self) -> usize;

    /// Whether the last frame may be shorter than [`Self::frame_size`].
    fn accepts_short_frame(&self) -> bool;

    /// Encoder name, e.g. `pcm_s16le`.
    fn codec_name(&self) -> &str;

    /// Time base of frames and packets.
    fn time_base(&self) -> ffmpeg::Rational;
}
