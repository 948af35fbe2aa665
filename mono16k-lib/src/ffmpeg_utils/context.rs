//! FFmpeg context wrappers for input handling

use crate::error::{FfmpegError, Result};
use ffmpeg_next as ffmpeg;
use std::path::Path;

/// Wrapper for an opened FFmpeg input context
///
/// The context is opened and probed by [`super::io::open_input`] and closed
/// on drop.
pub struct InputContext {
    inner: ffmpeg::format::context::Input,
    source_path: std::path::PathBuf,
}

impl InputContext {
    /// Open a media file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        super::init()?;

        if !path.exists() {
            return Err(FfmpegError::OpenInput(format!("{:?} does not exist", path)).into());
        }

        let inner = super::io::open_input(path)?;

        tracing::debug!(
            format = inner.format().name(),
            streams = inner.streams().len(),
            "Opened input file: {:?}",
            path
        );

        Ok(Self {
            inner,
            source_path: path.to_path_buf(),
        })
    }

    /// Get the source file path
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Short name of the detected container format
    pub fn format_name(&self) -> &str {
        self.inner.format().name()
    }

    /// Duration of the media in seconds, when the container knows it
    pub fn duration(&self) -> Option<f64> {
        super::utils::duration_secs(self.inner.duration())
    }

    /// Get a stream by index
    pub fn stream(&self, index: usize) -> Option<ffmpeg::Stream<'_>> {
        self.inner.stream(index)
    }

    /// Iterate over all streams in file order
    pub fn streams(&self) -> impl Iterator<Item = ffmpeg::Stream<'_>> + '_ {
        self.inner.streams().into_iter()
    }

    /// Index of the first audio stream in file order, not FFmpeg's "best" one
    pub fn first_audio_stream(&self) -> Option<usize> {
        self.streams()
            .find(|s| s.parameters().medium() == ffmpeg::media::Type::Audio)
            .map(|s| s.index())
    }

    /// Mutable access, needed to read packets
    pub fn inner_mut(&mut self) -> &mut ffmpeg::format::context::Input {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudioError;
    use crate::tests::fixtures;

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = InputContext::open(dir.path().join("missing.mp4")).err();
        assert!(matches!(
            err,
            Some(AudioError::Ffmpeg(FfmpegError::OpenInput(_)))
        ));
    }

    #[test]
    fn test_unrecognized_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = InputContext::open(fixtures::garbage(dir.path())).err();
        assert!(matches!(
            err,
            Some(AudioError::Ffmpeg(FfmpegError::OpenInput(_)))
        ));
    }

    #[test]
    fn test_first_audio_stream_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixtures::video_then_audio(dir.path(), &[0.0; 2048]);
        let input = InputContext::open(&path).unwrap();
        assert_eq!(input.source_path(), path.as_path());
        assert_eq!(input.format_name(), "nut");
        assert_eq!(input.streams().count(), 2);
        assert_eq!(input.first_audio_stream(), Some(1));
    }

    #[test]
    fn test_no_audio_stream() {
        let dir = tempfile::tempdir().unwrap();
        let input = InputContext::open(fixtures::video_only(dir.path())).unwrap();
        assert_eq!(input.first_audio_stream(), None);
        assert!(input.stream(0).is_some());
        assert!(input.stream(1).is_none());
    }
}
