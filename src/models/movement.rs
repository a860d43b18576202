use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MovementStatus {
    Stationary,
    Moving,
}

impl Default for MovementStatus {
    fn default() -> Self {
        MovementStatus::Stationary
    }
}

/// Raw push from the device sensors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Compass heading in degrees, any range.
    pub heading: f64,
    /// Accelerometer reading [x, y, z] in m/s², gravity included.
    pub acceleration: [f64; 3],
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SensorHealth {
    Nominal,
    Unavailable,
}

/// Classified movement state. Replaced on every tick, never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovementSample {
    pub status: MovementStatus,
    /// Degrees in [0, 360).
    pub bearing: f64,
    pub speed: f64,
    pub health: SensorHealth,
    pub at: DateTime<Utc>,
}

impl MovementSample {
    /// Neutral sample emitted while the sensor is unavailable.
    pub fn neutral(bearing: f64) -> Self {
        Self {
            status: MovementStatus::Stationary,
            bearing,
            speed: 0.0,
            health: SensorHealth::Unavailable,
            at: Utc::now(),
        }
    }

    pub fn is_moving(&self) -> bool {
        self.status == MovementStatus::Moving
    }
}

impl Default for MovementSample {
    fn default() -> Self {
        Self::neutral(0.0)
    }
}
