//! Audio resampling
//!
//! [`AudioResampler`] converts decoded PCM frames to the fixed 16 kHz / mono /
//! packed S16 format. [`EncoderFormatConverter`] goes the other way for
//! encoders that do not take S16 directly (e.g. AAC wants planar float).

use crate::error::{FfmpegError, Result};
use crate::ffmpeg_utils::helpers;
use crate::pcm::{TARGET_CHANNEL_LAYOUT, TARGET_SAMPLE_FORMAT, TARGET_SAMPLE_RATE};
use ffmpeg_next as ffmpeg;
use ffmpeg_next::software::resampling;
use ffmpeg_next::util::channel_layout::ChannelLayout;
use ffmpeg_next::util::format::sample::Sample;

use super::PcmConverter;

/// Resampler wrapping FFmpeg's `SwrContext`, fixed to 16 kHz mono S16 output
pub struct AudioResampler {
    context: resampling::Context,
    input: (Sample, ChannelLayout, u32),
}

impl AudioResampler {
    /// Create a resampler from the decoder's output description.
    ///
    /// Fails when FFmpeg cannot initialize the conversion (for example an
    /// unknown sample format or a zero sample rate).
    pub fn new(format: Sample, layout: ChannelLayout, rate: u32) -> Result<Self> {
        let context = Self::build(format, layout, rate)?;
        Ok(Self {
            context,
            input: (format, layout, rate),
        })
    }

    fn build(format: Sample, layout: ChannelLayout, rate: u32) -> Result<resampling::Context> {
        if rate == 0 {
            return Err(
                FfmpegError::ResamplerCreate("input sample rate is unknown".into()).into(),
            );
        }

        let context = resampling::Context::get(
            format,
            layout,
            rate,
            TARGET_SAMPLE_FORMAT,
            TARGET_CHANNEL_LAYOUT,
            TARGET_SAMPLE_RATE,
        )
        .map_err(|e| {
            FfmpegError::ResamplerCreate(format!(
                "{:?} {}ch {} Hz -> s16 mono {} Hz: {}",
                format,
                layout.channels(),
                rate,
                TARGET_SAMPLE_RATE,
                e
            ))
        })?;

        tracing::debug!(
            ?format,
            channels = layout.channels(),
            rate,
            "Resampler configured for s16 mono {} Hz",
            TARGET_SAMPLE_RATE
        );

        Ok(context)
    }

    /// Make `frame` acceptable to the current context.
    ///
    /// Frames with an unspecified layout get the default layout for their
    /// channel count (SwrContext rejects them otherwise). If the decoder
    /// changes format, layout or rate mid-stream, the context is rebuilt and
    /// the samples the old one still held are returned.
    fn prepare(&mut self, frame: &mut ffmpeg::util::frame::Audio) -> Result<Vec<i16>> {
        if frame.channel_layout().bits() == 0 {
            frame.set_channel_layout(helpers::default_layout(frame.channels()));
        }

        let input = (frame.format(), frame.channel_layout(), frame.rate());
        if input == self.input {
            return Ok(Vec::new());
        }

        tracing::debug!(
            from = ?self.input,
            to = ?input,
            "Decoder output changed, rebuilding resampler"
        );
        let pending = self.flush()?;
        self.context = Self::build(input.0, input.1, input.2)?;
        self.input = input;
        Ok(pending)
    }

    /// Output frame with room for everything the next conversion may emit
    fn output_frame(&mut self, in_samples: usize) -> Option<ffmpeg::util::frame::Audio> {
        let capacity = helpers::resampler_out_samples(&mut self.context, in_samples);
        if capacity == 0 {
            return None;
        }
        let mut out =
            ffmpeg::util::frame::Audio::new(TARGET_SAMPLE_FORMAT, capacity, TARGET_CHANNEL_LAYOUT);
        out.set_rate(TARGET_SAMPLE_RATE);
        Some(out)
    }
}

impl PcmConverter for AudioResampler {
    fn convert(&mut self, frame: &mut ffmpeg::util::frame::Audio) -> Result<Vec<i16>> {
        let mut samples = self.prepare(frame)?;
        let Some(mut out) = self.output_frame(frame.samples()) else {
            return Ok(samples);
        };

        self.context
            .run(frame, &mut out)
            .map_err(|e| FfmpegError::Resample(format!("swr_convert_frame: {}", e)))?;

        samples.extend_from_slice(&s16_samples(&out));
        Ok(samples)
    }

    /// Flush any remaining samples from the internal resampler buffer.
    ///
    /// When source and output rates match there is nothing buffered and the
    /// call is a no-op.
    fn flush(&mut self) -> Result<Vec<i16>> {
        let Some(mut out) = self.output_frame(0) else {
            return Ok(Vec::new());
        };

        match self.context.flush(&mut out) {
            Ok(_) => Ok(s16_samples(&out)),
            Err(e) => {
                tracing::debug!("Resampler flush returned non-fatal error: {}", e);
                Ok(Vec::new())
            }
        }
    }
}

/// Samples of a packed mono S16 frame
fn s16_samples(frame: &ffmpeg::util::frame::Audio) -> Vec<i16> {
    if frame.samples() == 0 {
        return Vec::new();
    }
    frame.plane::<i16>(0).to_vec()
}

/// Converts 16 kHz mono S16 frames into an encoder's sample format.
///
/// Rates and layout match on both sides, so every call emits exactly as many
/// samples as it receives.
pub struct EncoderFormatConverter {
    context: resampling::Context,
    format: Sample,
}

impl EncoderFormatConverter {
    /// Create a converter to `format`, or `None` when the encoder already
    /// takes packed S16.
    pub fn for_format(format: Sample) -> Result<Option<Self>> {
        if format == TARGET_SAMPLE_FORMAT {
            return Ok(None);
        }

        let context = resampling::Context::get(
            TARGET_SAMPLE_FORMAT,
            TARGET_CHANNEL_LAYOUT,
            TARGET_SAMPLE_RATE,
            format,
            TARGET_CHANNEL_LAYOUT,
            TARGET_SAMPLE_RATE,
        )
        .map_err(|e| {
            FfmpegError::ResamplerCreate(format!("s16 mono -> {:?} mono: {}", format, e))
        })?;

        tracing::debug!(?format, "Encoder sample format converter configured");
        Ok(Some(Self { context, format }))
    }

    /// Convert one S16 frame; the result carries no timestamp.
    pub fn convert(
        &mut self,
        frame: &ffmpeg::util::frame::Audio,
    ) -> Result<ffmpeg::util::frame::Audio> {
        let mut out =
            ffmpeg::util::frame::Audio::new(self.format, frame.samples(), TARGET_CHANNEL_LAYOUT);
        out.set_rate(TARGET_SAMPLE_RATE);
        self.context
            .run(frame, &mut out)
            .map_err(|e| FfmpegError::Resample(format!("s16 -> {:?}: {}", self.format, e)))?;
        Ok(out)
    }
}

/// Build a packed mono S16 frame at 16 kHz holding `samples`.
pub fn s16_frame(samples: &[i16]) -> ffmpeg::util::frame::Audio {
    let mut frame =
        ffmpeg::util::frame::Audio::new(TARGET_SAMPLE_FORMAT, samples.len(), TARGET_CHANNEL_LAYOUT);
    frame.set_rate(TARGET_SAMPLE_RATE);
    frame.plane_mut::<i16>(0)[..samples.len()].copy_from_slice(samples);
    frame
}
