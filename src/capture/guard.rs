use std::time::{Duration, Instant};

use super::phash::compute_hamming_distance;
use super::CaptureSettings;

/// Remembers the last frame the classifier could not place, so pointing the
/// camera at the same unhelpful view again does not trigger another call.
#[derive(Debug, Clone)]
pub struct FrameGuard {
    max_distance: u32,
    cooldown: Duration,
    last_rejected: Option<(String, Instant)>,
}

impl FrameGuard {
    pub fn new(settings: &CaptureSettings) -> Self {
        Self {
            max_distance: settings.duplicate_distance,
            cooldown: Duration::from_millis(settings.duplicate_cooldown_ms),
            last_rejected: None,
        }
    }

    pub fn is_duplicate(&self, phash: &str) -> bool {
        self.is_duplicate_at(phash, Instant::now())
    }

    fn is_duplicate_at(&self, phash: &str, now: Instant) -> bool {
        let Some((last, at)) = &self.last_rejected else {
            return false;
        };
        if now.saturating_duration_since(*at) >= self.cooldown {
            return false;
        }
        compute_hamming_distance(last, phash) <= self.max_distance
    }

    pub fn record_rejection(&mut self, phash: String) {
        self.last_rejected = Some((phash, Instant::now()));
    }

    pub fn clear(&mut self) {
        self.last_rejected = None;
    }
}
