//! Audio decoder for the decode pipeline
//!
//! Wraps an FFmpeg `AVCodecContext` to decode compressed audio packets
//! (AAC, MP3, Opus, FLAC, PCM, …) into raw PCM `AVFrame`s.

use crate::error::{FfmpegError, Result};
use crate::ffmpeg_utils::helpers;
use ffmpeg_next as ffmpeg;
use ffmpeg_next::util::channel_layout::ChannelLayout;

use super::FrameSource;

/// Audio decoder backed by a FFmpeg codec context
pub struct AudioDecoder {
    decoder: ffmpeg::decoder::Audio,
    stream_index: usize,
    codec_id: ffmpeg::codec::Id,
    /// Reject packets the decoder refuses instead of skipping them
    strict: bool,
}

impl AudioDecoder {
    /// Open a decoder for the given stream.
    ///
    /// The decoder is looked up by the stream's codec id; the context is
    /// filled from the stream's own codec parameters and then opened.
    pub fn open(stream: &ffmpeg::format::stream::Stream) -> Result<Self> {
        let stream_index = stream.index();
        let params = stream.parameters();
        let codec_id = params.id();

        let codec = ffmpeg::codec::decoder::find(codec_id).ok_or_else(|| {
            FfmpegError::DecoderNotFound(format!("{:?} (stream {})", codec_id, stream_index))
        })?;
        let codec_name = codec.name().to_string();

        let context = ffmpeg::codec::Context::from_parameters(params).map_err(|e| {
            FfmpegError::DecoderCreate(format!(
                "Failed to create codec context for stream {}: {}",
                stream_index, e
            ))
        })?;

        let decoder = context
            .decoder()
            .open_as(codec)
            .and_then(|opened| opened.audio())
            .map_err(|e| {
                FfmpegError::DecoderCreate(format!(
                    "Failed to open {} decoder for stream {}: {}",
                    codec_name,
                    stream_index,
                    e
                ))
            })?;

        tracing::debug!(
            stream_index,
            codec = %codec_name,
            rate = decoder.rate(),
            channels = decoder.channels(),
            format = ?decoder.format(),
            "Audio decoder opened"
        );

        Ok(Self {
            decoder,
            stream_index,
            codec_id,
            strict: false,
        })
    }

    /// Treat packets the decoder rejects as hard errors.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// The source stream index.
    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    /// Codec of the source stream.
    pub fn codec_id(&self) -> ffmpeg::codec::Id {
        self.codec_id
    }

    /// Sample rate of decoded frames.
    pub fn sample_rate(&self) -> u32 {
        self.decoder.rate()
    }

    /// Channel count of decoded frames.
    pub fn channels(&self) -> u16 {
        self.decoder.channels()
    }

    /// Sample format of decoded frames.
    pub fn format(&self) -> ffmpeg::util::format::sample::Sample {
        self.decoder.format()
    }

    /// Channel layout of decoded frames, derived from the channel count when
    /// the stream does not declare one.
    pub fn channel_layout(&self) -> ChannelLayout {
        let layout = self.decoder.channel_layout();
        if layout.bits() == 0 {
            helpers::default_layout(self.channels())
        } else {
            layout
        }
    }
}

impl FrameSource for AudioDecoder {
    /// `AVERROR_INVALIDDATA` and other rejections skip the packet unless the
    /// decoder is strict.
    fn send_packet(&mut self, packet: &ffmpeg::codec::packet::Packet) -> Result<()> {
        match self.decoder.send_packet(packet) {
            Ok(()) => Ok(()),
            Err(e) if !self.strict => {
                tracing::warn!(
                    stream_index = self.stream_index,
                    "send_packet: skipping packet the decoder rejected: {}",
                    e
                );
                Ok(())
            }
            Err(e) => Err(FfmpegError::DecodePacket(format!(
                "send_packet error on stream {}: {}",
                self.stream_index, e
            ))
            .into()),
        }
    }

    /// EAGAIN and EOF responses are ignored: the decoder has nothing buffered
    /// or is already finished.
    fn send_eof(&mut self) -> Result<()> {
        match self.decoder.send_eof() {
            Ok(()) => Ok(()),
            Err(e) if crate::ffmpeg_utils::utils::is_again_or_eof(&e) => Ok(()),
            Err(e) => Err(FfmpegError::DecodePacket(format!(
                "send_eof error on stream {}: {}",
                self.stream_index, e
            ))
            .into()),
        }
    }

    fn receive_frame(&mut self) -> Result<Option<ffmpeg::util::frame::Audio>> {
        let mut frame = ffmpeg::util::frame::Audio::empty();
        match self.decoder.receive_frame(&mut frame) {
            Ok(()) => Ok(Some(frame)),
            Err(e) if crate::ffmpeg_utils::utils::is_again_or_eof(&e) => Ok(None),
            Err(e) => Err(FfmpegError::DecodePacket(format!(
                "receive_frame error on stream {}: {}",
                self.stream_index, e
            ))
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_pcm_decoder() {
        crate::ffmpeg_utils::init().unwrap();
        let decoder = ffmpeg::codec::decoder::find(ffmpeg::codec::Id::PCM_S16LE);
        assert!(decoder.is_some());
        assert_eq!(decoder.unwrap().id(), ffmpeg::codec::Id::PCM_S16LE);
    }

    #[test]
    fn test_open_reports_source_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = crate::tests::fixtures::video_then_audio(dir.path(), &[0.25; 4410]);
        let input = crate::ffmpeg_utils::context::InputContext::open(&path).unwrap();

        let decoder = AudioDecoder::open(&input.stream(1).unwrap()).unwrap();
        assert_eq!(decoder.stream_index(), 1);
        assert_eq!(decoder.codec_id(), ffmpeg::codec::Id::PCM_S16LE);
        assert_eq!(decoder.sample_rate(), 44100);
        assert_eq!(decoder.channels(), 2);
        assert_eq!(decoder.channel_layout().channels(), 2);
    }

    #[test]
    fn test_video_stream_has_no_audio_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let path = crate::tests::fixtures::video_only(dir.path());
        let input = crate::ffmpeg_utils::context::InputContext::open(&path).unwrap();
        assert!(AudioDecoder::open(&input.stream(0).unwrap()).is_err());
    }

    #[test]
    fn test_no_decoder_for_none_codec() {
        crate::ffmpeg_utils::init().unwrap();
        assert!(ffmpeg::codec::decoder::find(ffmpeg::codec::Id::None).is_none());
    }
}
