use crate::config::{DecoderConfig, EncoderConfig};
use crate::error::{AudioError, Result};
use crate::ffmpeg_utils::context::InputContext;
use crate::ffmpeg_utils::{helpers, utils};
use crate::session::{EncodeSession, EncodeSummary};
use crate::transcode::decoder::AudioDecoder;
use crate::transcode::pipeline::decode_stream;
use crate::transcode::resampler::AudioResampler;
use crate::types::{DecodedAudio, MediaInfo, StreamInfo};
use ffmpeg_next as ffmpeg;
use std::path::Path;

/// Decode the first audio stream of a file to 16 kHz mono samples
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<DecodedAudio> {
    decode_file_with(path, &DecoderConfig::default())
}

/// Decode the first audio stream of a file with explicit settings.
///
/// Setup failures (unreadable file, no audio stream, missing decoder,
/// resampler init) are returned as errors. A decode error after the first
/// packet is not: the samples produced so far are returned and the error is
/// recorded in [`DecodedAudio::aborted`].
pub fn decode_file_with<P: AsRef<Path>>(path: P, config: &DecoderConfig) -> Result<DecodedAudio> {
    let path = path.as_ref();
    let mut input = InputContext::open(path)?;

    let no_audio = || AudioError::NoAudioStream(input.source_path().display().to_string());
    let stream_index = input.first_audio_stream().ok_or_else(no_audio)?;

    let mut decoder = {
        let stream = input.stream(stream_index).ok_or_else(no_audio)?;
        AudioDecoder::open(&stream)?
    };
    decoder.set_strict(!config.skip_invalid_packets);

    let mut resampler = AudioResampler::new(
        decoder.format(),
        decoder.channel_layout(),
        decoder.sample_rate(),
    )?;

    let mut audio = DecodedAudio {
        stream_index,
        source_codec: utils::codec_name(decoder.codec_id()).to_string(),
        source_rate: decoder.sample_rate(),
        source_channels: decoder.channels(),
        ..Default::default()
    };

    let packets = input
        .inner_mut()
        .packets()
        .map(|(stream, packet)| (stream.index(), packet));
    let run = decode_stream(
        packets,
        stream_index,
        &mut decoder,
        &mut resampler,
        &mut audio.samples,
    );
    audio.aborted = run.aborted.map(|e| e.to_string());

    tracing::info!(
        path = %path.display(),
        stream_index,
        codec = %audio.source_codec,
        packets = run.packets_decoded,
        frames = run.frames,
        samples = audio.samples.len(),
        complete = audio.aborted.is_none(),
        "Decoded audio stream"
    );

    Ok(audio)
}

/// Decode a file's first audio stream, or return no samples.
///
/// Any setup failure is logged and yields an empty sequence. Partial output
/// is returned when decoding fails midway.
pub fn open_file<P: AsRef<Path>>(path: P) -> Vec<f64> {
    let path = path.as_ref();
    match decode_file(path) {
        Ok(audio) => audio.into_samples(),
        Err(e) => {
            tracing::error!(path = %path.display(), "Failed to decode audio: {}", e);
            Vec::new()
        }
    }
}

/// Describe a media file's container and streams
pub fn probe_file<P: AsRef<Path>>(path: P) -> Result<MediaInfo> {
    let path = path.as_ref();
    let input = InputContext::open(path)?;

    let streams = input
        .streams()
        .map(|stream| {
            let params = stream.parameters();
            let medium = params.medium();
            let is_audio = medium == ffmpeg::media::Type::Audio;
            StreamInfo {
                index: stream.index(),
                medium: utils::media_type_name(medium).to_string(),
                codec: utils::codec_name(params.id()).to_string(),
                decodable: helpers::decoder_exists(params.id()),
                sample_rate: is_audio.then(|| helpers::codec_params_sample_rate(&params)),
                channels: is_audio.then(|| helpers::codec_params_channels(&params)),
                bit_rate: Some(helpers::codec_params_bit_rate(&params)).filter(|&b| b > 0),
            }
        })
        .collect();

    let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

    Ok(MediaInfo {
        format: input.format_name().to_string(),
        duration_secs: input.duration(),
        file_size,
        streams,
        selected_audio_stream: input.first_audio_stream(),
    })
}

/// Three-call encode interface over [`EncodeSession`].
///
/// Holds at most one open output. `write_data` and `close_output_file`
/// fail with [`AudioError::SessionNotOpen`] when nothing is open, and
/// `create_output_file` fails with [`AudioError::SessionAlreadyOpen`] while
/// an output is still open. After a close a new output may be created.
#[derive(Default)]
pub struct AudioFile {
    config: EncoderConfig,
    session: Option<EncodeSession>,
}

impl AudioFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EncoderConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// See [`open_file`].
    pub fn open_file<P: AsRef<Path>>(&self, path: P) -> Vec<f64> {
        open_file(path)
    }

    pub fn create_output_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        if let Some(session) = &self.session {
            return Err(AudioError::SessionAlreadyOpen(
                session.path().display().to_string(),
            ));
        }
        self.session = Some(EncodeSession::create(path, &self.config)?);
        Ok(())
    }

    pub fn write_data(&mut self, samples: &[f64]) -> Result<()> {
        self.session
            .as_mut()
            .ok_or(AudioError::SessionNotOpen)?
            .write(samples)
    }

    pub fn close_output_file(&mut self) -> Result<EncodeSummary> {
        self.session
            .take()
            .ok_or(AudioError::SessionNotOpen)?
            .close()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// The open session, if any
    pub fn session(&self) -> Option<&EncodeSession> {
        self.session.as_ref()
    }
}
