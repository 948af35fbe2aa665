use super::fixtures;
use crate::probe_file;

#[test]
fn test_probe_mono_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::mono_wav(dir.path(), &fixtures::sine(440.0, 16000, 2.0, 0.5));

    let info = probe_file(&path).unwrap();
    assert_eq!(info.format, "wav");
    assert_eq!(info.streams.len(), 1);
    assert_eq!(info.selected_audio_stream, Some(0));
    assert!(info.file_size > 64000);

    let stream = &info.streams[0];
    assert_eq!(stream.medium, "audio");
    assert_eq!(stream.codec, "pcm_s16le");
    assert_eq!(stream.sample_rate, Some(16000));
    assert_eq!(stream.channels, Some(1));
    assert!(stream.decodable);

    let duration = info.duration_secs.unwrap();
    assert!((duration - 2.0).abs() < 0.05, "duration {}", duration);
}

#[test]
fn test_probe_lists_streams_in_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::video_then_audio(dir.path(), &fixtures::sine(440.0, 44100, 0.5, 0.5));

    let info = probe_file(&path).unwrap();
    assert_eq!(info.format, "nut");
    let media: Vec<&str> = info.streams.iter().map(|s| s.medium.as_str()).collect();
    assert_eq!(media, ["video", "audio"]);
    assert_eq!(info.selected_audio_stream, Some(1));
    assert_eq!(info.streams[0].sample_rate, None);
    assert_eq!(info.audio_streams().count(), 1);
    assert_eq!(info.streams[1].channels, Some(2));
}

#[test]
fn test_probe_video_only_selects_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let info = probe_file(fixtures::video_only(dir.path())).unwrap();
    assert_eq!(info.selected_audio_stream, None);
    assert_eq!(info.audio_streams().count(), 0);
}

#[test]
fn test_probe_serializes_to_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixtures::mono_wav(dir.path(), &fixtures::sine(440.0, 16000, 0.1, 0.5));

    let json = serde_json::to_value(probe_file(&path).unwrap()).unwrap();
    assert_eq!(json["format"], "wav");
    assert_eq!(json["selected_audio_stream"], 0);
    assert_eq!(json["streams"][0]["sample_rate"], 16000);
}

#[test]
fn test_probe_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(probe_file(dir.path().join("nope.mkv")).is_err());
}
