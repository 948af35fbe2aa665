//! Encode session
//!
//! An [`EncodeSession`] owns everything an output file needs between
//! creation and finalization: the muxer context, its single audio stream,
//! the encoder and a FIFO that re-buffers caller batches into encoder-sized
//! frames. Dropping an unfinished session finalizes it.

use ffmpeg_next as ffmpeg;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::config::EncoderConfig;
use crate::error::{FfmpegError, Result};
use crate::ffmpeg_utils::{self, io};
use crate::pcm::{self, target_time_base};
use crate::transcode::encoder::{select_codec, AudioEncoder};
use crate::transcode::PacketEncoder;
use crate::transcode::resampler::{s16_frame, EncoderFormatConverter};

/// Index of the only stream an encode session creates
const OUTPUT_STREAM: usize = 0;

/// What a finished encode session wrote
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct EncodeSummary {
    /// Output file path
    pub path: PathBuf,
    /// Encoder name
    pub codec: String,
    /// Samples accepted from callers
    pub samples_written: u64,
    /// Silence appended to fill the last frame for encoders that cannot
    /// take a short one
    pub padded_samples: u64,
    /// Frames handed to the encoder
    pub frames_encoded: u64,
    /// Packets written to the container
    pub packets_written: u64,
}

impl EncodeSummary {
    /// Duration of the written audio in seconds
    pub fn duration_secs(&self) -> f64 {
        pcm::duration_secs(self.samples_written as usize)
    }
}

/// An open output file accepting normalized 16 kHz mono samples
pub struct EncodeSession {
    output: ffmpeg::format::context::Output,
    encoder: Box<dyn PacketEncoder + Send>,
    converter: Option<EncoderFormatConverter>,
    stream_time_base: ffmpeg::Rational,
    path: PathBuf,
    pending: VecDeque<i16>,
    /// Timestamp of the next frame, in samples handed to the encoder
    next_pts: i64,
    samples_written: u64,
    padded_samples: u64,
    frames_encoded: u64,
    packets_written: u64,
    finished: bool,
}

impl EncodeSession {
    /// Create `path`, choose a container from its extension and an encoder
    /// for it, and write the container header.
    ///
    /// Any failing step returns an error and releases what was already
    /// allocated.
    pub fn create<P: AsRef<Path>>(path: P, config: &EncoderConfig) -> Result<Self> {
        let path = path.as_ref();
        ffmpeg_utils::init()?;
        config.validate()?;

        let mut output = io::open_output(path)?;
        let format = output.format();
        let codec = select_codec(&format, path, config)?;
        let global_header = format
            .flags()
            .contains(ffmpeg::format::Flags::GLOBAL_HEADER);

        let encoder = AudioEncoder::open(codec, config, global_header)?;
        let converter = EncoderFormatConverter::for_format(encoder.format())?;

        {
            let mut stream = output.add_stream(codec).map_err(|e| {
                FfmpegError::StreamConfig(format!("Could not create output stream: {}", e))
            })?;
            stream.set_parameters(encoder.codec_parameters());
            stream.set_time_base(target_time_base());
        }

        output.write_header().map_err(|e| {
            FfmpegError::WriteHeader(format!("{}: {}", path.display(), e))
        })?;

        // The muxer may pick its own time base while writing the header
        let stream_time_base = output
            .stream(OUTPUT_STREAM)
            .map(|s| s.time_base())
            .ok_or_else(|| FfmpegError::StreamConfig("output stream vanished".into()))?;

        tracing::info!(
            path = %path.display(),
            format = format.name(),
            codec = encoder.codec_name(),
            frame_size = encoder.frame_size(),
            "Output file created"
        );

        Ok(Self {
            output,
            encoder: Box::new(encoder),
            converter,
            stream_time_base,
            path: path.to_path_buf(),
            pending: VecDeque::new(),
            next_pts: 0,
            samples_written: 0,
            padded_samples: 0,
            frames_encoded: 0,
            packets_written: 0,
            finished: false,
        })
    }

    /// Encode a batch of normalized samples.
    ///
    /// Batches of any size are accepted: samples are queued and sent to the
    /// encoder in frames of [`Self::frame_size`], so a partial frame waits
    /// for the next call or for [`Self::close`].
    pub fn write(&mut self, samples: &[f64]) -> Result<()> {
        self.pending.extend(samples.iter().map(|&s| pcm::unit_to_s16(s)));
        self.samples_written += samples.len() as u64;

        let frame_size = self.encoder.frame_size();
        while self.pending.len() >= frame_size {
            let chunk: Vec<i16> = self.pending.drain(..frame_size).collect();
            self.encode_chunk(&chunk)?;
        }
        Ok(())
    }

    /// Encode what is still queued, flush the encoder and write the trailer.
    pub fn close(mut self) -> Result<EncodeSummary> {
        self.finish()?;
        Ok(self.summary())
    }

    /// Samples accepted so far.
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Samples queued but not yet handed to the encoder.
    pub fn pending_samples(&self) -> usize {
        self.pending.len()
    }

    /// Samples per encoder frame.
    pub fn frame_size(&self) -> usize {
        self.encoder.frame_size()
    }

    /// Encoder name.
    pub fn codec_name(&self) -> &str {
        self.encoder.codec_name()
    }

    /// Output file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn summary(&self) -> EncodeSummary {
        EncodeSummary {
            path: self.path.clone(),
            codec: self.encoder.codec_name().to_string(),
            samples_written: self.samples_written,
            padded_samples: self.padded_samples,
            frames_encoded: self.frames_encoded,
            packets_written: self.packets_written,
        }
    }

    /// Single teardown path shared by `close` and `Drop`.
    ///
    /// The trailer is written even when encoding the tail or flushing the
    /// encoder fails; the first error is returned.
    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let flushed = self.flush_encoder();
        if let Err(e) = &flushed {
            tracing::warn!(
                path = %self.path.display(),
                "Encoder flush failed, writing trailer anyway: {}",
                e
            );
        }

        let trailer: Result<()> = self.output.write_trailer().map_err(|e| {
            FfmpegError::WriteTrailer(format!("{}: {}", self.path.display(), e)).into()
        });
        flushed.and(trailer)?;

        tracing::info!(
            path = %self.path.display(),
            samples = self.samples_written,
            padded = self.padded_samples,
            frames = self.frames_encoded,
            packets = self.packets_written,
            "Output file closed"
        );
        Ok(())
    }

    /// Encode the FIFO tail, send EOF and write the remaining packets.
    fn flush_encoder(&mut self) -> Result<()> {
        let mut tail: Vec<i16> = self.pending.drain(..).collect();
        if !tail.is_empty() {
            let frame_size = self.encoder.frame_size();
            if !self.encoder.accepts_short_frame() && tail.len() < frame_size {
                self.padded_samples = (frame_size - tail.len()) as u64;
                tail.resize(frame_size, 0);
            }
            self.encode_chunk(&tail)?;
        }

        self.encoder.send_eof()?;
        self.drain_packets()
    }

    fn encode_chunk(&mut self, chunk: &[i16]) -> Result<()> {
        let s16 = s16_frame(chunk);
        let mut frame = match self.converter.as_mut() {
            Some(converter) => converter.convert(&s16)?,
            None => s16,
        };
        frame.set_pts(Some(self.next_pts));

        self.encoder.send_frame(&frame)?;
        self.next_pts += chunk.len() as i64;
        self.frames_encoded += 1;

        self.drain_packets()
    }

    /// Write every packet the encoder has ready, in emission order.
    fn drain_packets(&mut self) -> Result<()> {
        while let Some(mut packet) = self.encoder.receive_packet()? {
            packet.set_stream(OUTPUT_STREAM);
            packet.rescale_ts(self.encoder.time_base(), self.stream_time_base);
            packet.write_interleaved(&mut self.output).map_err(|e| {
                FfmpegError::WritePacket(format!("{}: {}", self.path.display(), e))
            })?;
            self.packets_written += 1;
        }
        Ok(())
    }
}

impl Drop for EncodeSession {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::warn!(
            path = %self.path.display(),
            "Encode session dropped without close, finalizing"
        );
        if let Err(e) = self.finish() {
            tracing::error!(path = %self.path.display(), "Failed to finalize output: {}", e);
        }
    }
}
