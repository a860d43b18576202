pub mod classifier;
pub mod controller;
mod loop_worker;
pub mod simulated;

pub use classifier::{normalize_bearing, MovementClassifier, MovementConfig};
pub use controller::TelemetryFeed;
pub use simulated::SimulatedSensor;
