//! Movement classification from compass heading and raw acceleration.
//!
//! Gravity is tracked with a slow low-pass filter and subtracted from each
//! reading; the magnitude of what remains is smoothed into an activity level
//! that is compared against a fixed threshold. Output is advisory: it paces
//! the overlay and never drives navigation state.

use serde::{Deserialize, Serialize};

use crate::models::{MovementSample, MovementStatus, SensorHealth, SensorReading};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MovementConfig {
    /// Smoothed linear acceleration (m/s²) at or above which the user is moving.
    pub moving_threshold: f64,
    /// Low-pass factor for the gravity estimate (0-1, lower = slower).
    pub gravity_alpha: f64,
    /// Smoothing factor for the activity level.
    pub smoothing: f64,
    /// Activity to walking-speed scale (m/s per m/s²).
    pub speed_gain: f64,
    /// No reading for this long means the sensor is unavailable.
    pub stale_after_ms: u64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            moving_threshold: 1.2,
            gravity_alpha: 0.1,
            smoothing: 0.2,
            speed_gain: 0.6,
            stale_after_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MovementClassifier {
    config: MovementConfig,
    gravity: Option<[f64; 3]>,
    activity: f64,
    last_bearing: f64,
}

impl MovementClassifier {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            gravity: None,
            activity: 0.0,
            last_bearing: 0.0,
        }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn last_bearing(&self) -> f64 {
        self.last_bearing
    }

    /// Classify one reading. Invalid readings yield a neutral sample and leave
    /// the filters untouched.
    pub fn classify(&mut self, reading: &SensorReading) -> MovementSample {
        let valid = reading.heading.is_finite() && reading.acceleration.iter().all(|a| a.is_finite());
        if !valid {
            return MovementSample::neutral(self.last_bearing);
        }

        let accel = reading.acceleration;
        let gravity = match self.gravity {
            // First reading seeds the estimate, so it has no linear component.
            None => accel,
            Some(g) => {
                let alpha = self.config.gravity_alpha;
                [
                    g[0] + alpha * (accel[0] - g[0]),
                    g[1] + alpha * (accel[1] - g[1]),
                    g[2] + alpha * (accel[2] - g[2]),
                ]
            }
        };
        self.gravity = Some(gravity);

        let linear = ((accel[0] - gravity[0]).powi(2)
            + (accel[1] - gravity[1]).powi(2)
            + (accel[2] - gravity[2]).powi(2))
        .sqrt();
        self.activity += self.config.smoothing * (linear - self.activity);
        self.last_bearing = normalize_bearing(reading.heading);

        let moving = self.activity >= self.config.moving_threshold;
        MovementSample {
            status: if moving {
                MovementStatus::Moving
            } else {
                MovementStatus::Stationary
            },
            bearing: self.last_bearing,
            speed: if moving {
                self.activity * self.config.speed_gain
            } else {
                0.0
            },
            health: SensorHealth::Nominal,
            at: chrono::Utc::now(),
        }
    }

    /// Forget filter state, e.g. after the sensor went quiet.
    pub fn reset(&mut self) {
        self.gravity = None;
        self.activity = 0.0;
    }
}

/// Map any heading onto [0, 360).
pub fn normalize_bearing(heading: f64) -> f64 {
    let bearing = heading.rem_euclid(360.0);
    if bearing >= 360.0 {
        0.0
    } else {
        bearing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const G: f64 = 9.81;

    fn still(heading: f64) -> SensorReading {
        SensorReading {
            heading,
            acceleration: [0.0, 0.0, G],
        }
    }

    fn walking(count: usize) -> Vec<SensorReading> {
        (0..count)
            .map(|i| SensorReading {
                heading: 90.0,
                acceleration: [if i % 2 == 0 { 3.0 } else { -3.0 }, 0.0, G],
            })
            .collect()
    }

    #[test]
    fn test_standing_still_is_stationary() {
        let mut classifier = MovementClassifier::new(MovementConfig::default());
        for _ in 0..20 {
            let sample = classifier.classify(&still(10.0));
            assert_eq!(sample.status, MovementStatus::Stationary);
            assert_eq!(sample.speed, 0.0);
            assert_eq!(sample.health, SensorHealth::Nominal);
        }
    }

    #[test]
    fn test_oscillating_acceleration_is_moving_then_settles() {
        let mut classifier = MovementClassifier::new(MovementConfig::default());
        let mut last = MovementSample::default();
        for reading in walking(40) {
            last = classifier.classify(&reading);
        }
        assert!(last.is_moving());
        assert!(last.speed > 0.0);

        for _ in 0..60 {
            last = classifier.classify(&still(90.0));
        }
        assert_eq!(last.status, MovementStatus::Stationary);
    }

    #[test]
    fn test_bearing_is_normalized() {
        assert_eq!(normalize_bearing(-90.0), 270.0);
        assert_eq!(normalize_bearing(725.0), 5.0);
        assert_eq!(normalize_bearing(360.0), 0.0);
        let tiny = normalize_bearing(-1e-20);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_invalid_reading_is_neutral() {
        let mut classifier = MovementClassifier::new(MovementConfig::default());
        classifier.classify(&still(45.0));
        let sample = classifier.classify(&SensorReading {
            heading: f64::NAN,
            acceleration: [0.0, 0.0, G],
        });
        assert_eq!(sample.health, SensorHealth::Unavailable);
        assert_eq!(sample.status, MovementStatus::Stationary);
        assert_eq!(sample.bearing, 45.0);
    }
}
