//! Frame sources.
//!
//! This module provides position-addressed access to decoded video frames:
//! - Local video files (feature: ingest-file-ffmpeg)
//! - Stub source (testing, `stub://` paths)
//!
//! A source answers "the frame at playback position N ms", which is how the
//! sampling loop asks for frames; it may legitimately have no frame to
//! return (at or past the end-of-stream boundary), and callers skip that
//! tick without recording anything.

pub mod file;
#[cfg(feature = "ingest-file-ffmpeg")]
pub(crate) mod file_ffmpeg;

pub use file::{FileConfig, FileSource, FileStats};

/// One decoded frame handed to the detection pipeline.
///
/// Pixels are tightly-packed RGB24 rows. `position_ms` is the playback
/// position the frame was sampled for, not a wall-clock time.
#[derive(Clone, Debug)]
pub struct VideoFrame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub position_ms: u64,
}
