//! FFmpeg utility functions

use ffmpeg_next as ffmpeg;

/// Get the codec name for a codec ID
pub fn codec_name(codec_id: ffmpeg::codec::Id) -> &'static str {
    codec_id.name()
}

/// Get the media type name
pub fn media_type_name(media_type: ffmpeg::media::Type) -> &'static str {
    match media_type {
        ffmpeg::media::Type::Video => "video",
        ffmpeg::media::Type::Audio => "audio",
        ffmpeg::media::Type::Subtitle => "subtitle",
        ffmpeg::media::Type::Data => "data",
        ffmpeg::media::Type::Attachment => "attachment",
        _ => "unknown",
    }
}

/// Render an `AV_VERSION_INT` as `major.minor.micro`
pub fn format_lib_version(version: u32) -> String {
    format!(
        "{}.{}.{}",
        version >> 16,
        (version >> 8) & 0xff,
        version & 0xff
    )
}

/// Convert an FFmpeg duration in `AV_TIME_BASE` units to seconds.
///
/// Unknown durations (`AV_NOPTS_VALUE` or negative) become `None`.
pub fn duration_secs(duration: i64) -> Option<f64> {
    if duration < 0 {
        return None;
    }
    Some(duration as f64 / ffmpeg::ffi::AV_TIME_BASE as f64)
}

/// Check whether an FFmpeg error means "no output right now" rather than a failure
pub fn is_again_or_eof(err: &ffmpeg::Error) -> bool {
    match err {
        ffmpeg::Error::Other { errno } => *errno == ffmpeg::error::EAGAIN,
        ffmpeg::Error::Eof => true,
        _ => false,
    }
}
