mod detection;
mod movement;
mod node;

pub use detection::{ArrivalVerdict, DetectionResult, DetectionRole};
pub use movement::{MovementSample, MovementStatus, SensorHealth, SensorReading};
pub use node::{CampusEdge, CampusNode, NodeCategory, NodeId};
