//! Synthetic frame source.
//!
//! Renders a slowly drifting gradient and encodes it as JPEG, so the
//! streaming path can be exercised end to end without a camera.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use std::time::{Duration, Instant};

use super::FrameSource;

const JPEG_QUALITY: u8 = 75;

#[derive(Clone, Debug)]
pub struct StubConfig {
    pub width: u32,
    pub height: u32,
    /// Frames per second the source paces itself to. Zero disables pacing.
    pub target_fps: u32,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            target_fps: 10,
        }
    }
}

pub struct StubSource {
    config: StubConfig,
    frame_count: u64,
    last_frame_at: Option<Instant>,
}

impl StubSource {
    pub fn new(config: StubConfig) -> Self {
        Self {
            config,
            frame_count: 0,
            last_frame_at: None,
        }
    }

    pub fn frames_captured(&self) -> u64 {
        self.frame_count
    }
}

impl FrameSource for StubSource {
    fn next_frame(&mut self) -> Result<Vec<u8>> {
        let min_interval = frame_interval(self.config.target_fps);
        if let Some(last) = self.last_frame_at {
            let elapsed = last.elapsed();
            if elapsed < min_interval {
                std::thread::sleep(min_interval - elapsed);
            }
        }

        let width = self.config.width;
        let height = self.config.height;
        let phase = (self.frame_count % 256) as u8;
        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                rgb.push(((x * 255 / width.max(1)) as u8).wrapping_add(phase));
                rgb.push((y * 255 / height.max(1)) as u8);
                rgb.push(phase);
            }
        }

        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
            .encode(&rgb, width, height, ExtendedColorType::Rgb8)
            .context("encode stub frame")?;

        self.frame_count += 1;
        self.last_frame_at = Some(Instant::now());
        Ok(jpeg)
    }
}

fn frame_interval(target_fps: u32) -> Duration {
    if target_fps == 0 {
        Duration::from_millis(0)
    } else {
        Duration::from_millis((1000 / target_fps).max(1) as u64)
    }
}
