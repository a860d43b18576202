//! Camera frame preparation and duplicate suppression.

use serde::{Deserialize, Serialize};

pub mod frame;
pub mod guard;
pub mod phash;

pub use frame::CapturedFrame;
pub use guard::FrameGuard;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureSettings {
    /// Longest edge, in pixels, after downscaling.
    pub max_edge: u32,
    pub jpeg_quality: u8,
    /// Hamming distance at or below which two frames count as the same view.
    pub duplicate_distance: u32,
    pub duplicate_cooldown_ms: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            max_edge: 1024,
            jpeg_quality: 80,
            duplicate_distance: 4,
            duplicate_cooldown_ms: 3_000,
        }
    }
}
