use serde::{Deserialize, Serialize};

use crate::models::DetectionRole;

/// Acceptance thresholds for classifier output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ArbiterConfig {
    /// "Where am I" detections at or above this are applied without asking.
    pub locate_threshold: f64,

    /// "What is my target" detections at or above this are applied without asking.
    pub destination_threshold: f64,

    /// Arrival verdicts must be strictly above this to count.
    pub arrival_threshold: f64,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            locate_threshold: 0.85,
            destination_threshold: 0.80,
            arrival_threshold: 0.70,
        }
    }
}

impl ArbiterConfig {
    pub fn threshold_for(&self, role: DetectionRole) -> f64 {
        match role {
            DetectionRole::Locate => self.locate_threshold,
            DetectionRole::Destination => self.destination_threshold,
        }
    }
}
