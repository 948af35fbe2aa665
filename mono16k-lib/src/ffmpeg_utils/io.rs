//! Input and output context creation
//!
//! `ffmpeg::format::output` always calls `avio_open`, even for formats that
//! declare `AVFMT_NOFILE` and manage their own I/O, and `ffmpeg::format::input`
//! reports a failed open and a failed stream probe with the same bare error
//! code. Both contexts are built by hand here instead.

use ffmpeg_next as ffmpeg;
use std::ffi::CString;
use std::path::Path;
use std::ptr;

use crate::error::{AudioError, FfmpegError, Result};

/// Convert a path into the C string FFmpeg expects
pub fn path_to_cstring(path: &Path) -> Result<CString> {
    CString::new(path.to_string_lossy().as_bytes())
        .map_err(|_| AudioError::InvalidPath(format!("{:?} contains a NUL byte", path)))
}

/// Open `path`, detect its container and read stream info.
///
/// Failing to open or recognize the file is [`FfmpegError::OpenInput`];
/// failing to read stream info from a recognized file is
/// [`FfmpegError::FindStreamInfo`]. The returned `Input` closes the file on
/// drop.
pub fn open_input(path: &Path) -> Result<ffmpeg::format::context::Input> {
    let filename = path_to_cstring(path)?;

    unsafe {
        let mut input_ptr: *mut ffmpeg::ffi::AVFormatContext = ptr::null_mut();

        // SAFETY: `input_ptr` is a valid out-pointer and `filename` outlives
        // the call. On failure FFmpeg frees the context and nulls the pointer.
        let ret = ffmpeg::ffi::avformat_open_input(
            &mut input_ptr,
            filename.as_ptr(),
            ptr::null(),
            ptr::null_mut(),
        );
        if ret < 0 {
            return Err(FfmpegError::OpenInput(format!(
                "Failed to open {:?}: {}",
                path,
                ffmpeg::Error::from(ret)
            ))
            .into());
        }

        // SAFETY: `input_ptr` was just opened successfully.
        let ret = ffmpeg::ffi::avformat_find_stream_info(input_ptr, ptr::null_mut());
        if ret < 0 {
            ffmpeg::ffi::avformat_close_input(&mut input_ptr);
            return Err(FfmpegError::FindStreamInfo(format!(
                "{:?}: {}",
                path,
                ffmpeg::Error::from(ret)
            ))
            .into());
        }

        // `Input`'s drop runs `avformat_close_input`, matching the open above.
        Ok(ffmpeg::format::context::Input::wrap(input_ptr))
    }
}

/// Allocate an output context whose container is guessed from `path`'s
/// extension, and open the file for writing unless the format is `NOFILE`.
///
/// The returned `Output` closes the sink and frees the context on drop.
pub fn open_output(path: &Path) -> Result<ffmpeg::format::context::Output> {
    let filename = path_to_cstring(path)?;

    unsafe {
        let mut output_ptr: *mut ffmpeg::ffi::AVFormatContext = ptr::null_mut();

        // SAFETY: `output_ptr` is a valid out-pointer and `filename` outlives
        // the call. On failure FFmpeg leaves `output_ptr` null.
        let ret = ffmpeg::ffi::avformat_alloc_output_context2(
            &mut output_ptr,
            ptr::null_mut(),
            ptr::null(),
            filename.as_ptr(),
        );

        if ret < 0 || output_ptr.is_null() {
            tracing::debug!(
                "avformat_alloc_output_context2 failed for {:?}: {}",
                path,
                ffmpeg::Error::from(ret)
            );
            return Err(AudioError::UnknownFormat(path.display().to_string()));
        }

        // SAFETY: `output_ptr` is non-null and `oformat` is always set by a
        // successful `avformat_alloc_output_context2`.
        let flags = (*(*output_ptr).oformat).flags;
        if flags & ffmpeg::ffi::AVFMT_NOFILE as i32 == 0 {
            let ret = ffmpeg::ffi::avio_open(
                &mut (*output_ptr).pb,
                filename.as_ptr(),
                ffmpeg::ffi::AVIO_FLAG_WRITE as i32,
            );
            if ret < 0 {
                ffmpeg::ffi::avformat_free_context(output_ptr);
                return Err(FfmpegError::MuxerCreate(format!(
                    "Could not open output file {:?}: {}",
                    path,
                    ffmpeg::Error::from(ret)
                ))
                .into());
            }
        } else {
            tracing::debug!("Output format for {:?} manages its own I/O", path);
        }

        // `Output`'s drop runs `avio_close(pb)` (a no-op on null) followed by
        // `avformat_free_context`, which matches how the context was built.
        Ok(ffmpeg::format::context::Output::wrap(output_ptr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_to_cstring() {
        let c = path_to_cstring(Path::new("/tmp/out.wav")).unwrap();
        assert_eq!(c.to_str().unwrap(), "/tmp/out.wav");
    }

    #[test]
    fn test_open_input_reads_streams() {
        let dir = tempfile::tempdir().unwrap();
        let path = crate::tests::fixtures::video_then_audio(dir.path(), &[0.0; 1024]);
        let input = open_input(&path).unwrap();
        assert_eq!(input.format().name(), "nut");
        assert_eq!(input.streams().count(), 2);
    }

    #[test]
    fn test_open_input_unrecognized_file() {
        crate::ffmpeg_utils::init().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = open_input(&crate::tests::fixtures::garbage(dir.path())).unwrap_err();
        assert!(matches!(err, AudioError::Ffmpeg(FfmpegError::OpenInput(_))));
    }

    #[test]
    fn test_open_output_unknown_extension() {
        crate::ffmpeg_utils::init().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = open_output(&dir.path().join("out.not-a-format")).unwrap_err();
        assert!(matches!(err, AudioError::UnknownFormat(_)));
    }

    #[test]
    fn test_open_output_creates_file() {
        crate::ffmpeg_utils::init().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let output = open_output(&path).unwrap();
        assert_eq!(output.format().name(), "wav");
        assert!(path.exists());
    }

    #[test]
    fn test_open_output_missing_directory() {
        crate::ffmpeg_utils::init().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = open_output(&dir.path().join("missing").join("out.wav")).unwrap_err();
        assert!(matches!(err, AudioError::Ffmpeg(FfmpegError::MuxerCreate(_))));
    }
}
