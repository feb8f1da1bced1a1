//! Local file frame source.
//!
//! `FileSource` serves decoded frames addressed by playback position. Real
//! video files are decoded with FFmpeg (feature: ingest-file-ffmpeg);
//! `stub://` paths select an in-memory synthetic decoder so the rest of the
//! system can run without media on disk.

use anyhow::{anyhow, Result};

#[cfg(feature = "ingest-file-ffmpeg")]
use super::file_ffmpeg::FfmpegFileSource;
use super::VideoFrame;

/// Configuration for a local file source.
#[derive(Clone, Debug)]
pub struct FileConfig {
    /// Local file path or `stub://` name.
    pub path: String,
    /// Frame width for the stub decoder.
    pub width: u32,
    /// Frame height for the stub decoder.
    pub height: u32,
    /// Synthetic stream length for the stub decoder.
    pub stub_duration_ms: u64,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            width: 640,
            height: 480,
            stub_duration_ms: 30_000,
        }
    }
}

/// Local file frame source.
pub struct FileSource {
    backend: FileBackend,
}

enum FileBackend {
    Synthetic(SyntheticFileSource),
    #[cfg(feature = "ingest-file-ffmpeg")]
    Ffmpeg(FfmpegFileSource),
}

impl FileSource {
    pub fn new(config: FileConfig) -> Result<Self> {
        if !is_local_file_path(&config.path) {
            return Err(anyhow!(
                "file ingestion only supports local paths (no URL schemes)"
            ));
        }
        if config.path.starts_with("stub://") {
            Ok(Self {
                backend: FileBackend::Synthetic(SyntheticFileSource::new(config)),
            })
        } else {
            #[cfg(feature = "ingest-file-ffmpeg")]
            {
                Ok(Self {
                    backend: FileBackend::Ffmpeg(FfmpegFileSource::new(config)?),
                })
            }
            #[cfg(not(feature = "ingest-file-ffmpeg"))]
            {
                Err(anyhow!(
                    "file ingestion requires the ingest-file-ffmpeg feature"
                ))
            }
        }
    }

    /// Connect to the file source.
    pub fn connect(&mut self) -> Result<()> {
        match &mut self.backend {
            FileBackend::Synthetic(source) => source.connect(),
            #[cfg(feature = "ingest-file-ffmpeg")]
            FileBackend::Ffmpeg(source) => source.connect(),
        }
    }

    /// Decode the frame at a playback position.
    ///
    /// Returns `Ok(None)` at or past the end of the stream.
    pub fn frame_at(&mut self, position_ms: u64) -> Result<Option<VideoFrame>> {
        match &mut self.backend {
            FileBackend::Synthetic(source) => source.frame_at(position_ms),
            #[cfg(feature = "ingest-file-ffmpeg")]
            FileBackend::Ffmpeg(source) => source.frame_at(position_ms),
        }
    }

    /// Total stream length in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        match &self.backend {
            FileBackend::Synthetic(source) => source.duration_ms(),
            #[cfg(feature = "ingest-file-ffmpeg")]
            FileBackend::Ffmpeg(source) => source.duration_ms(),
        }
    }

    /// Check if the source is healthy.
    pub fn is_healthy(&self) -> bool {
        match &self.backend {
            FileBackend::Synthetic(source) => source.is_healthy(),
            #[cfg(feature = "ingest-file-ffmpeg")]
            FileBackend::Ffmpeg(source) => source.is_healthy(),
        }
    }

    /// Get frame statistics.
    pub fn stats(&self) -> FileStats {
        match &self.backend {
            FileBackend::Synthetic(source) => source.stats(),
            #[cfg(feature = "ingest-file-ffmpeg")]
            FileBackend::Ffmpeg(source) => source.stats(),
        }
    }
}

/// Statistics for a file source.
#[derive(Clone, Debug)]
pub struct FileStats {
    pub frames_served: u64,
    pub path: String,
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://) for tests
// ----------------------------------------------------------------------------

struct SyntheticFileSource {
    config: FileConfig,
    frames_served: u64,
}

impl SyntheticFileSource {
    fn new(config: FileConfig) -> Self {
        Self {
            config,
            frames_served: 0,
        }
    }

    fn connect(&mut self) -> Result<()> {
        log::info!("FileSource: connected to {} (synthetic)", self.config.path);
        Ok(())
    }

    fn frame_at(&mut self, position_ms: u64) -> Result<Option<VideoFrame>> {
        if position_ms >= self.config.stub_duration_ms {
            return Ok(None);
        }

        self.frames_served += 1;
        Ok(Some(VideoFrame {
            pixels: self.generate_synthetic_pixels(position_ms),
            width: self.config.width,
            height: self.config.height,
            position_ms,
        }))
    }

    fn generate_synthetic_pixels(&self, position_ms: u64) -> Vec<u8> {
        let pixel_count = (self.config.width * self.config.height * 3) as usize;
        // The scene shifts once per second so consecutive samples differ.
        let scene_state = position_ms / 1000;
        let mut pixels = vec![0u8; pixel_count];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = ((i as u64 + scene_state) % 256) as u8;
        }
        pixels
    }

    fn duration_ms(&self) -> u64 {
        self.config.stub_duration_ms
    }

    fn is_healthy(&self) -> bool {
        true
    }

    fn stats(&self) -> FileStats {
        FileStats {
            frames_served: self.frames_served,
            path: self.config.path.clone(),
        }
    }
}

fn is_local_file_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    if path.starts_with("stub://") {
        return true;
    }
    !path.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub_config() -> FileConfig {
        FileConfig {
            path: "stub://cabin_camera".to_string(),
            stub_duration_ms: 5_000,
            ..FileConfig::default()
        }
    }

    #[test]
    fn stub_source_serves_frames_within_duration() {
        let mut source = FileSource::new(stub_config()).expect("stub source");
        source.connect().expect("connect");

        let frame = source.frame_at(1_000).expect("frame").expect("some frame");
        assert_eq!(frame.width, 640);
        assert_eq!(frame.height, 480);
        assert_eq!(frame.pixels.len(), 640 * 480 * 3);
        assert_eq!(frame.position_ms, 1_000);
        assert_eq!(source.stats().frames_served, 1);
    }

    #[test]
    fn stub_source_returns_none_past_the_boundary() {
        let mut source = FileSource::new(stub_config()).expect("stub source");
        assert!(source.frame_at(5_000).expect("frame").is_none());
        assert!(source.frame_at(9_999).expect("frame").is_none());
        assert_eq!(source.stats().frames_served, 0);
    }

    #[test]
    fn stub_pixels_are_deterministic_per_position() {
        let mut source = FileSource::new(stub_config()).expect("stub source");
        let a = source.frame_at(2_000).unwrap().unwrap();
        let b = source.frame_at(2_000).unwrap().unwrap();
        assert_eq!(a.pixels, b.pixels);
    }

    #[test]
    fn remote_urls_are_rejected() {
        let config = FileConfig {
            path: "http://example.com/video.mp4".to_string(),
            ..FileConfig::default()
        };
        assert!(FileSource::new(config).is_err());
    }
}
