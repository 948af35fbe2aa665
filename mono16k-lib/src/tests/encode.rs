//! Encode session and `AudioFile` tests

use super::fixtures;
use crate::{decode_file, probe_file, AudioError, AudioFile, EncodeSession, EncoderConfig};

const TOLERANCE: f64 = 2.0 / 32767.0;

fn assert_close(expected: &[f64], actual: &[f64]) {
    assert_eq!(expected.len(), actual.len());
    for (i, (a, b)) in expected.iter().zip(actual).enumerate() {
        assert!((a - b).abs() <= TOLERANCE, "sample {}: {} vs {}", i, a, b);
    }
}

#[test]
fn test_odd_batches_encode_every_sample() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batches.wav");
    let input = fixtures::sine(440.0, 16000, 3702.0 / 16000.0, 0.6);
    assert_eq!(input.len(), 3702);

    let mut session = EncodeSession::create(&path, &EncoderConfig::default()).unwrap();
    for batch in input.chunks(1234) {
        session.write(batch).unwrap();
    }
    let summary = session.close().unwrap();
    assert_eq!(summary.samples_written, 3702);
    assert_eq!(summary.codec, "pcm_s16le");

    assert_close(&input, &decode_file(&path).unwrap().samples);
}

#[test]
fn test_batches_larger_than_frame_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("large.wav");
    let input = fixtures::sine(220.0, 16000, 2.0, 0.4);

    let mut session = EncodeSession::create(&path, &EncoderConfig::default()).unwrap();
    session.write(&input).unwrap();
    let summary = session.close().unwrap();
    // 32000 samples in frames of 8000
    assert_eq!(summary.frames_encoded, 4);

    assert_close(&input, &decode_file(&path).unwrap().samples);
}

#[test]
fn test_fixed_frame_size_encoder() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batches.flac");
    if ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::FLAC).is_none() {
        return; // FFmpeg built without the FLAC encoder
    }
    let input = fixtures::sine(440.0, 16000, 3702.0 / 16000.0, 0.6);

    let mut session = EncodeSession::create(&path, &EncoderConfig::default()).unwrap();
    assert_eq!(session.codec_name(), "flac");
    assert!(session.frame_size() > 0);
    for batch in input.chunks(1234) {
        session.write(batch).unwrap();
    }
    session.close().unwrap();

    assert_close(&input, &decode_file(&path).unwrap().samples);
}

#[test]
fn test_float_encoder_gets_converted_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("float.wav");
    let input = fixtures::sine(440.0, 16000, 0.5, 0.7);

    let config = EncoderConfig::default().with_codec("pcm_f32le");
    let mut session = EncodeSession::create(&path, &config).unwrap();
    session.write(&input).unwrap();
    session.close().unwrap();

    let decoded = decode_file(&path).unwrap();
    assert_eq!(decoded.source_codec, "pcm_f32le");
    assert_close(&input, &decoded.samples);
}

#[test]
fn test_close_without_data_is_valid_container() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.wav");

    let summary = EncodeSession::create(&path, &EncoderConfig::default())
        .unwrap()
        .close()
        .unwrap();
    assert_eq!(summary.samples_written, 0);

    let info = probe_file(&path).unwrap();
    assert_eq!(info.format, "wav");
    assert_eq!(info.selected_audio_stream, Some(0));
    assert!(decode_file(&path).unwrap().is_empty());
}

#[test]
fn test_dropped_session_is_finalized() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dropped.wav");
    let input = fixtures::sine(440.0, 16000, 0.3, 0.5);
    {
        let mut session = EncodeSession::create(&path, &EncoderConfig::default()).unwrap();
        session.write(&input).unwrap();
    }
    assert_close(&input, &decode_file(&path).unwrap().samples);
}

#[test]
fn test_audio_file_call_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = AudioFile::new();

    assert!(matches!(file.write_data(&[0.0]), Err(AudioError::SessionNotOpen)));
    assert!(matches!(file.close_output_file(), Err(AudioError::SessionNotOpen)));

    let first = dir.path().join("first.wav");
    file.create_output_file(&first).unwrap();
    assert!(file.is_open());
    assert!(matches!(
        file.create_output_file(dir.path().join("second.wav")),
        Err(AudioError::SessionAlreadyOpen(_))
    ));

    let input = fixtures::sine(440.0, 16000, 0.2, 0.5);
    file.write_data(&input).unwrap();
    let summary = file.close_output_file().unwrap();
    assert_eq!(summary.samples_written, input.len() as u64);
    assert!(!file.is_open());
    assert!(matches!(file.write_data(&[0.0]), Err(AudioError::SessionNotOpen)));

    // A closed AudioFile can start over
    let third = dir.path().join("third.wav");
    file.create_output_file(&third).unwrap();
    file.write_data(&input[..100]).unwrap();
    file.close_output_file().unwrap();

    assert_close(&input, &file.open_file(&first));
    assert_eq!(file.open_file(&third).len(), 100);
}

#[test]
fn test_failed_create_leaves_audio_file_closed() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = AudioFile::new();
    assert!(file
        .create_output_file(dir.path().join("out.not-a-format"))
        .is_err());
    assert!(!file.is_open());
    file.create_output_file(dir.path().join("out.wav")).unwrap();
    file.close_output_file().unwrap();
}

#[test]
fn test_out_of_range_samples_are_clamped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clamped.wav");
    let mut session = EncodeSession::create(&path, &EncoderConfig::default()).unwrap();
    session.write(&[2.0, -7.5, f64::NAN, 0.5]).unwrap();
    session.close().unwrap();

    let decoded = decode_file(&path).unwrap().samples;
    assert_eq!(decoded.len(), 4);
    assert_eq!(decoded[0], 1.0);
    assert_eq!(decoded[1], -1.0);
    assert_eq!(decoded[2], 0.0);
    assert!((decoded[3] - 0.5).abs() <= TOLERANCE);
}
