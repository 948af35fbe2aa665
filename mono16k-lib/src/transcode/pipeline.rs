//! Decode pipeline
//!
//! Combines `AudioDecoder` → `AudioResampler` to turn the packets of one
//! audio stream into a normalized 16 kHz mono sample sequence.

use ffmpeg_next as ffmpeg;

use crate::error::{AudioError, Result};
use crate::pcm;

use super::{FrameSource, PcmConverter};

/// How a decode loop ended
#[derive(Debug, Default)]
pub struct DecodeRun {
    /// Packets of the selected stream handed to the decoder
    pub packets_decoded: usize,
    /// Packets belonging to other streams, dropped undecoded
    pub packets_skipped: usize,
    /// Frames produced by the decoder
    pub frames: usize,
    /// The error that stopped decoding early, if any
    pub aborted: Option<AudioError>,
}

/// Decode every packet of `stream_index` into `out`.
///
/// Packets of other streams are dropped. A hard decoder or resampler error
/// stops the loop; what was appended to `out` before it stays there and the
/// error is returned in [`DecodeRun::aborted`]. When the packets run out
/// normally the decoder is drained and the resampler flushed.
pub fn decode_stream<I, D, C>(
    packets: I,
    stream_index: usize,
    decoder: &mut D,
    converter: &mut C,
    out: &mut Vec<f64>,
) -> DecodeRun
where
    I: IntoIterator<Item = (usize, ffmpeg::codec::packet::Packet)>,
    D: FrameSource,
    C: PcmConverter,
{
    let mut run = DecodeRun::default();

    for (index, packet) in packets {
        if index != stream_index {
            run.packets_skipped += 1;
            continue;
        }
        run.packets_decoded += 1;

        let step = decoder
            .send_packet(&packet)
            .and_then(|()| drain_frames(decoder, converter, out, &mut run.frames));
        if let Err(e) = step {
            tracing::warn!(
                stream_index,
                packets = run.packets_decoded,
                samples = out.len(),
                "Decoding stopped early: {}",
                e
            );
            run.aborted = Some(e);
            return run;
        }
    }

    let tail = decoder
        .send_eof()
        .and_then(|()| drain_frames(decoder, converter, out, &mut run.frames))
        .and_then(|()| converter.flush());
    match tail {
        Ok(samples) => pcm::extend_from_s16(out, &samples),
        Err(e) => {
            tracing::warn!(stream_index, "Failed to drain decoder at end of input: {}", e);
            run.aborted = Some(e);
        }
    }

    run
}

/// Pull frames until the decoder wants more input, converting each one.
fn drain_frames<D, C>(
    decoder: &mut D,
    converter: &mut C,
    out: &mut Vec<f64>,
    frames: &mut usize,
) -> Result<()>
where
    D: FrameSource,
    C: PcmConverter,
{
    while let Some(mut frame) = decoder.receive_frame()? {
        *frames += 1;
        let samples = converter.convert(&mut frame)?;
        pcm::extend_from_s16(out, &samples);
    }
    Ok(())
}
