//! Audio encoder for the encode session
//!
//! Wraps an FFmpeg `AVCodecContext` configured for 16 kHz mono input and
//! whatever codec the output container calls for.

use crate::config::EncoderConfig;
use crate::error::{FfmpegError, Result};
use crate::ffmpeg_utils::helpers;
use crate::pcm::{target_time_base, TARGET_CHANNEL_LAYOUT, TARGET_SAMPLE_RATE};
use crate::transcode::PacketEncoder;
use ffmpeg_next as ffmpeg;
use ffmpeg_next::codec;
use ffmpeg_next::util::format::sample::Sample;
use std::path::Path;

/// Pick the encoder for an output file.
///
/// A codec named in `config` wins; otherwise FFmpeg guesses the audio codec
/// from the output format and filename.
pub fn select_codec(
    format: &ffmpeg::format::format::Output,
    path: &Path,
    config: &EncoderConfig,
) -> Result<codec::Codec> {
    if let Some(name) = &config.codec {
        return ffmpeg::encoder::find_by_name(name).ok_or_else(|| {
            FfmpegError::EncoderNotFound(format!("no encoder named {:?}", name)).into()
        });
    }

    let codec_id = format.codec(&path, ffmpeg::media::Type::Audio);
    if codec_id == codec::Id::None {
        return Err(FfmpegError::EncoderNotFound(format!(
            "{} has no default audio codec",
            format.name()
        ))
        .into());
    }

    ffmpeg::encoder::find(codec_id).ok_or_else(|| {
        FfmpegError::EncoderNotFound(format!(
            "{:?} (default audio codec of {})",
            codec_id,
            format.name()
        ))
        .into()
    })
}

/// Audio encoder backed by a real FFmpeg codec context
pub struct AudioEncoder {
    encoder: ffmpeg::encoder::Audio,
    codec_name: String,
    format: Sample,
    frame_size: usize,
    accepts_short_frame: bool,
}

impl AudioEncoder {
    /// Open `codec` for mono 16 kHz input.
    ///
    /// The sample format is the codec's first supported one. `global_header`
    /// must be set when the container stores codec extradata in its header.
    pub fn open(codec: codec::Codec, config: &EncoderConfig, global_header: bool) -> Result<Self> {
        let codec_name = codec.name().to_string();
        let format = helpers::first_sample_format(&codec);

        // Build context and configure the audio encoder BEFORE opening
        let mut context = codec::Context::new_with_codec(codec);
        context.set_time_base(target_time_base());

        let mut audio_enc = context.encoder().audio().map_err(|e| {
            FfmpegError::EncoderCreate(format!(
                "Cannot get audio encoder handle for {}: {}",
                codec_name, e
            ))
        })?;

        audio_enc.set_rate(TARGET_SAMPLE_RATE as i32);
        audio_enc.set_format(format);
        audio_enc.set_channel_layout(TARGET_CHANNEL_LAYOUT);
        audio_enc.set_bit_rate(config.bit_rate as usize);
        if global_header {
            audio_enc.set_flags(codec::Flags::GLOBAL_HEADER);
        }

        let encoder = audio_enc.open_as(codec).map_err(|e| {
            FfmpegError::EncoderCreate(format!("Failed to open {} encoder: {}", codec_name, e))
        })?;

        let capabilities = codec.capabilities();
        // Encoders that leave `frame_size` at 0 take frames of any length
        let accepts_short_frame = capabilities.contains(codec::Capabilities::SMALL_LAST_FRAME)
            || capabilities.contains(codec::Capabilities::VARIABLE_FRAME_SIZE)
            || encoder.frame_size() == 0;

        let frame_size = match encoder.frame_size() as usize {
            0 => config.fallback_frame_size,
            n => n,
        };

        tracing::debug!(
            codec = %codec_name,
            ?format,
            frame_size,
            accepts_short_frame,
            global_header,
            "Audio encoder opened"
        );

        Ok(Self {
            encoder,
            codec_name,
            format,
            frame_size,
            accepts_short_frame,
        })
    }

    /// Sample format the encoder was opened with.
    pub fn format(&self) -> Sample {
        self.format
    }

    /// Codec parameters for the output stream.
    pub fn codec_parameters(&self) -> ffmpeg::codec::Parameters {
        helpers::encoder_codec_parameters(&self.encoder)
    }
}

impl PacketEncoder for AudioEncoder {
    fn send_frame(&mut self, frame: &ffmpeg::util::frame::Audio) -> Result<()> {
        self.encoder.send_frame(frame).map_err(|e| {
            FfmpegError::EncodeFrame(format!("{} send_frame error: {}", self.codec_name, e)).into()
        })
    }

    /// An encoder that is already finished ignores a second EOF.
    fn send_eof(&mut self) -> Result<()> {
        match self.encoder.send_eof() {
            Ok(()) => Ok(()),
            Err(ffmpeg::Error::Eof) => Ok(()),
            Err(e) => Err(FfmpegError::EncodeFrame(format!(
                "{} send_eof error: {}",
                self.codec_name, e
            ))
            .into()),
        }
    }

    fn receive_packet(&mut self) -> Result<Option<ffmpeg::codec::packet::Packet>> {
        let mut packet = ffmpeg::codec::packet::Packet::empty();
        match self.encoder.receive_packet(&mut packet) {
            Ok(()) => Ok(Some(packet)),
            Err(e) if crate::ffmpeg_utils::utils::is_again_or_eof(&e) => Ok(None),
            Err(e) => Err(FfmpegError::EncodeFrame(format!(
                "{} receive_packet error: {}",
                self.codec_name, e
            ))
            .into()),
        }
    }

    /// The encoder's fixed frame size, or the configured fallback when the
    /// encoder accepts any size (PCM).
    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn accepts_short_frame(&self) -> bool {
        self.accepts_short_frame
    }

    fn codec_name(&self) -> &str {
        &self.codec_name
    }

    /// Always 1 / 16000.
    fn time_base(&self) -> ffmpeg::Rational {
        target_time_base()
    }
}
