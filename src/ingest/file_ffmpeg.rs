//! Local file frame source using FFmpeg.
//!
//! Position-addressed decoding: each request seeks to the nearest keyframe
//! before the requested playback position, then decodes forward until a
//! frame at or past that position appears. Frames are converted to
//! tightly-packed RGB24 in memory.

use anyhow::{anyhow, Context, Result};
use ffmpeg_next as ffmpeg;

use super::file::{FileConfig, FileStats};
use super::VideoFrame;

pub(crate) struct FfmpegFileSource {
    config: FileConfig,
    input: ffmpeg::format::context::Input,
    stream_index: usize,
    decoder: ffmpeg::codec::decoder::Video,
    scaler: ffmpeg::software::scaling::Context,
    /// Stream time base in seconds per tick.
    time_base: f64,
    duration_ms: u64,
    frames_served: u64,
    last_error: Option<String>,
}

impl FfmpegFileSource {
    pub(crate) fn new(config: FileConfig) -> Result<Self> {
        ffmpeg::init().context("initialize ffmpeg")?;
        let input = ffmpeg::format::input(&config.path)
            .with_context(|| format!("failed to open file input '{}' with ffmpeg", config.path))?;
        let input_stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| anyhow!("file has no video track"))?;
        let stream_index = input_stream.index();
        let time_base = f64::from(input_stream.time_base());
        let context = ffmpeg::codec::context::Context::from_parameters(input_stream.parameters())
            .context("load video decoder parameters")?;
        let decoder = context
            .decoder()
            .video()
            .context("open ffmpeg video decoder")?;

        let scaler = ffmpeg::software::scaling::context::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg::util::format::pixel::Pixel::RGB24,
            decoder.width(),
            decoder.height(),
            ffmpeg::software::scaling::flag::Flags::BILINEAR,
        )
        .context("create ffmpeg scaler")?;

        let duration_ms = if input.duration() > 0 {
            (input.duration() as u64).saturating_mul(1000) / ffmpeg::ffi::AV_TIME_BASE as u64
        } else {
            0
        };

        Ok(Self {
            config,
            input,
            stream_index,
            decoder,
            scaler,
            time_base,
            duration_ms,
            frames_served: 0,
            last_error: None,
        })
    }

    pub(crate) fn connect(&mut self) -> Result<()> {
        log::info!(
            "FileSource: connected to {} (ffmpeg, {} ms)",
            self.config.path,
            self.duration_ms
        );
        Ok(())
    }

    pub(crate) fn frame_at(&mut self, position_ms: u64) -> Result<Option<VideoFrame>> {
        if self.duration_ms > 0 && position_ms >= self.duration_ms {
            return Ok(None);
        }

        let target =
            position_ms as i64 * ffmpeg::ffi::AV_TIME_BASE as i64 / 1000;
        if let Err(err) = self.input.seek(target, ..target) {
            self.last_error = Some(format!("seek failed: {}", err));
            return Err(anyhow!("seek to {} ms failed: {}", position_ms, err));
        }
        self.decoder.flush();

        let mut decoded = ffmpeg::frame::Video::empty();
        let mut rgb_frame = ffmpeg::frame::Video::empty();

        for (stream, packet) in self.input.packets() {
            if stream.index() != self.stream_index {
                continue;
            }

            self.decoder
                .send_packet(&packet)
                .context("send packet to ffmpeg decoder")?;

            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let frame_ms = decoded
                    .pts()
                    .map(|pts| (pts as f64 * self.time_base * 1000.0) as u64)
                    .unwrap_or(position_ms);
                if frame_ms + 1 < position_ms {
                    // Still between the seek keyframe and the target.
                    continue;
                }

                self.scaler
                    .run(&decoded, &mut rgb_frame)
                    .context("scale frame to RGB")?;
                let (pixels, width, height) = frame_to_pixels(&rgb_frame)?;

                self.frames_served += 1;
                return Ok(Some(VideoFrame {
                    pixels,
                    width,
                    height,
                    position_ms,
                }));
            }
        }

        // End of stream before the target position.
        Ok(None)
    }

    pub(crate) fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub(crate) fn is_healthy(&self) -> bool {
        self.last_error.is_none()
    }

    pub(crate) fn stats(&self) -> FileStats {
        FileStats {
            frames_served: self.frames_served,
            path: self.config.path.clone(),
        }
    }
}

fn frame_to_pixels(frame: &ffmpeg::frame::Video) -> Result<(Vec<u8>, u32, u32)> {
    let width = frame.width();
    let height = frame.height();
    let row_bytes = (width as usize) * 3;
    let stride = frame.stride(0);
    let data = frame.data(0);

    if stride == row_bytes {
        return Ok((data.to_vec(), width, height));
    }

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        let end = start + row_bytes;
        pixels.extend_from_slice(
            data.get(start..end)
                .context("ffmpeg frame row is out of bounds")?,
        );
    }

    Ok((pixels, width, height))
}
