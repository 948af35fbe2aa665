//! FFmpeg module - wrappers and utilities for FFmpeg library access
//!
//! This module handles:
//! - One-time FFmpeg initialization
//! - Routing FFmpeg's log output into `tracing`
//! - Input/output context management
//! - Safe accessors for fields `ffmpeg-next` does not expose

pub mod context;
pub mod helpers;
pub mod io;
pub mod utils;

pub use ffmpeg_next as ffmpeg;

use std::sync::OnceLock;

static INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Initialize the FFmpeg library.
///
/// Safe to call any number of times from any thread: the underlying
/// `ffmpeg::init()` runs once per process and its outcome is remembered.
/// Decode and encode sessions call this themselves.
pub fn init() -> Result<(), crate::error::FfmpegError> {
    INIT.get_or_init(|| {
        let outcome = ffmpeg::init().map_err(|e| format!("ffmpeg::init() failed: {}", e));
        if outcome.is_ok() {
            tracing::info!("FFmpeg initialized ({})", version_info());
        }
        outcome
    })
    .clone()
    .map_err(crate::error::FfmpegError::InitFailed)
}

/// Route FFmpeg's own log output through `tracing`.
///
/// **Safety & Ordering:** must be called after `init()` and before any other
/// thread starts using FFmpeg, because replacing the global log callback is
/// not thread-safe.
pub fn install_log_filter() {
    // SAFETY: both functions modify global FFmpeg state and are called once,
    // after `ffmpeg::init()`, before sessions run on other threads.
    unsafe {
        ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_WARNING as i32);
        ffmpeg_next::ffi::av_log_set_callback(Some(ffmpeg_log_callback));
    }
}

/// Messages FFmpeg emits for every 16 kHz mono conversion that carry no information.
const SUPPRESSED_MESSAGES: &[&str] = &[
    "Estimating duration from bitrate",
    "Could not update timestamps for skipped samples",
    "Could not update timestamps for discarded samples",
    "Guessed Channel Layout",
];

unsafe extern "C" fn ffmpeg_log_callback(
    avcl: *mut std::ffi::c_void,
    level: std::ffi::c_int,
    fmt: *const std::ffi::c_char,
    vl: ffmpeg_next::ffi::va_list,
) {
    use std::ffi::CStr;

    if level > unsafe { ffmpeg_next::ffi::av_log_get_level() } {
        return;
    }

    let mut buf = [0 as std::ffi::c_char; 1024];
    let mut print_prefix: std::ffi::c_int = 1;
    ffmpeg_next::ffi::av_log_format_line(
        avcl,
        level,
        fmt,
        vl,
        buf.as_mut_ptr(),
        buf.len() as std::ffi::c_int,
        &mut print_prefix,
    );

    let msg = CStr::from_ptr(buf.as_ptr()).to_string_lossy();
    let msg = msg.trim_end();
    if msg.is_empty() || SUPPRESSED_MESSAGES.iter().any(|s| msg.contains(s)) {
        return;
    }

    match level {
        l if l <= ffmpeg_next::ffi::AV_LOG_ERROR as std::ffi::c_int => {
            tracing::error!(target: "ffmpeg", "{}", msg)
        }
        l if l <= ffmpeg_next::ffi::AV_LOG_WARNING as std::ffi::c_int => {
            tracing::warn!(target: "ffmpeg", "{}", msg)
        }
        l if l <= ffmpeg_next::ffi::AV_LOG_INFO as std::ffi::c_int => {
            tracing::info!(target: "ffmpeg", "{}", msg)
        }
        _ => tracing::debug!(target: "ffmpeg", "{}", msg),
    }
}

/// Versions of the linked libavutil, libavcodec and libavformat.
pub fn version_info() -> String {
    // SAFETY: the version getters read compile-time constants of the linked
    // libraries and have no preconditions.
    let (util, codec, format) = unsafe {
        (
            ffmpeg::ffi::avutil_version(),
            ffmpeg::ffi::avcodec_version(),
            ffmpeg::ffi::avformat_version(),
        )
    };
    format!(
        "libavutil {}, libavcodec {}, libavformat {}",
        utils::format_lib_version(util),
        utils::format_lib_version(codec),
        utils::format_lib_version(format)
    )
}
