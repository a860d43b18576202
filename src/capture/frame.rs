use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use super::phash::compute_phash;
use super::CaptureSettings;

/// A camera frame ready to send to a model: downscaled, JPEG-encoded and
/// fingerprinted.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub phash: String,
    pub captured_at: DateTime<Utc>,
}

impl CapturedFrame {
    /// Decode any format `image` understands. CPU-bound; call from `spawn_blocking`.
    pub fn prepare(bytes: &[u8], settings: &CaptureSettings) -> Result<Self> {
        let img = image::load_from_memory(bytes).context("failed to decode camera frame")?;

        let max_edge = settings.max_edge.max(1);
        let img = if img.width().max(img.height()) > max_edge {
            img.resize(max_edge, max_edge, FilterType::Triangle)
        } else {
            img
        };

        let phash = compute_phash(&img);
        let rgb = img.to_rgb8();
        let mut jpeg = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut jpeg, settings.jpeg_quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .context("failed to encode camera frame as JPEG")?;

        Ok(Self {
            jpeg,
            width: rgb.width(),
            height: rgb.height(),
            phash,
            captured_at: Utc::now(),
        })
    }
}
