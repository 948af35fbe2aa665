//! Subcommand implementations

use mono16k::{decode_file_with, probe_file, DecodedAudio, EncodeSession, EncodeSummary};
use std::path::Path;

use crate::config::CliConfig;
use crate::error::Result;

/// Decode `input`, report it, and optionally write the samples to `output`.
pub fn decode(config: &CliConfig, input: &Path, output: Option<&Path>) -> Result<()> {
    let audio = decode_input(config, input)?;
    println!(
        "{}: {} samples, {:.3} s at 16 kHz mono (stream {}, {} {} Hz {} ch)",
        input.display(),
        audio.len(),
        audio.duration_secs(),
        audio.stream_index,
        audio.source_codec,
        audio.source_rate,
        audio.source_channels
    );

    if let Some(output) = output {
        let summary = encode(config, &audio.samples, output, config.batch_size)?;
        print_summary(&summary);
    }
    Ok(())
}

/// Decode `input` and re-encode it into `output` in batches.
pub fn transcode(
    config: &CliConfig,
    input: &Path,
    output: &Path,
    batch: Option<usize>,
) -> Result<()> {
    let batch_size = batch.unwrap_or(config.batch_size);
    if batch_size == 0 {
        return Err(crate::error::CliError::Config(
            "--batch must be positive".into(),
        ));
    }

    let audio = decode_input(config, input)?;
    let summary = encode(config, &audio.samples, output, batch_size)?;
    print_summary(&summary);
    Ok(())
}

/// Print the container and stream description of `input` as JSON.
pub fn probe(input: &Path) -> Result<()> {
    let info = probe_file(input)?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn decode_input(config: &CliConfig, input: &Path) -> Result<DecodedAudio> {
    let audio = decode_file_with(input, &config.decoder)?;
    if let Some(reason) = &audio.aborted {
        tracing::warn!(
            "Decoding of {} stopped early after {} samples: {}",
            input.display(),
            audio.len(),
            reason
        );
    }
    Ok(audio)
}

fn encode(
    config: &CliConfig,
    samples: &[f64],
    output: &Path,
    batch_size: usize,
) -> Result<EncodeSummary> {
    let mut session = EncodeSession::create(output, &config.encoder)?;
    for batch in samples.chunks(batch_size) {
        session.write(batch)?;
    }
    tracing::debug!(
        batches = samples.len().div_ceil(batch_size),
        batch_size,
        "Wrote all batches"
    );
    Ok(session.close()?)
}

fn print_summary(summary: &EncodeSummary) {
    println!(
        "{}: {} samples, {:.3} s, codec {} ({} frames, {} packets)",
        summary.path.display(),
        summary.samples_written,
        summary.duration_secs(),
        summary.codec,
        summary.frames_encoded,
        summary.packets_written
    );
}
