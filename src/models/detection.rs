use serde::{Deserialize, Serialize};

use super::NodeId;

/// Which question a capture is answering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum DetectionRole {
    /// "Where am I?"
    Locate,
    /// "What is my target?"
    Destination,
}

impl DetectionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionRole::Locate => "locate",
            DetectionRole::Destination => "destination",
        }
    }
}

/// Raw classifier output for one capture.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub node_id: NodeId,
    pub confidence: f64,
    #[serde(default)]
    pub rationale: String,
}

impl DetectionResult {
    pub fn new(node_id: impl Into<NodeId>, confidence: f64, rationale: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            confidence,
            rationale: rationale.into(),
        }
    }
}

/// Arrival verifier output.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalVerdict {
    pub arrived: bool,
    pub confidence: f64,
}

impl ArrivalVerdict {
    pub fn not_arrived() -> Self {
        Self {
            arrived: false,
            confidence: 0.0,
        }
    }
}
