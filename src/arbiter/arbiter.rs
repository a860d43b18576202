use serde::Serialize;

use crate::graph::CampusGraph;
use crate::models::{DetectionResult, DetectionRole, NodeId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "reason", content = "nodeId")]
pub enum RejectReason {
    /// Classifier returned nothing, failed, or produced a non-finite score.
    DetectionFailure,
    /// Confidence was zero or negative.
    NoConfidence,
    /// Candidate is not a node of the loaded campus.
    UnknownNode(NodeId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Accept(NodeId),
    Pending(DetectionResult),
    Reject(RejectReason),
}

/// Map a raw detection onto accept / ask-the-user / reject.
///
/// `confidence >= threshold` accepts, `0 < confidence < threshold` asks,
/// anything else (missing result, `<= 0`, NaN) rejects. Scores above 1 are
/// clamped to 1.
pub fn arbitrate(result: Option<&DetectionResult>, threshold: f64) -> Decision {
    let Some(result) = result else {
        return Decision::Reject(RejectReason::DetectionFailure);
    };
    if result.confidence.is_nan() {
        return Decision::Reject(RejectReason::DetectionFailure);
    }

    let confidence = result.confidence.min(1.0);
    if confidence <= 0.0 {
        Decision::Reject(RejectReason::NoConfidence)
    } else if confidence >= threshold {
        Decision::Accept(result.node_id.clone())
    } else {
        Decision::Pending(DetectionResult {
            confidence,
            ..result.clone()
        })
    }
}

/// A low-confidence detection waiting for a yes/no from the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDetection {
    pub role: DetectionRole,
    pub generation: u64,
    pub result: DetectionResult,
}

/// Per-role arbiter holding at most one outstanding confirmation.
#[derive(Debug, Clone)]
pub struct DetectionArbiter {
    role: DetectionRole,
    threshold: f64,
    pending: Option<PendingDetection>,
}

impl DetectionArbiter {
    pub fn new(role: DetectionRole, threshold: f64) -> Self {
        Self {
            role,
            threshold,
            pending: None,
        }
    }

    pub fn role(&self) -> DetectionRole {
        self.role
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }

    pub fn pending(&self) -> Option<&PendingDetection> {
        self.pending.as_ref()
    }

    /// A new attempt for this role drops whatever was awaiting confirmation.
    pub fn supersede(&mut self) -> Option<PendingDetection> {
        self.pending.take()
    }

    /// Arbitrate a classifier response for this role. Pending results replace
    /// any earlier pending one.
    pub fn decide(
        &mut self,
        generation: u64,
        result: Option<&DetectionResult>,
        graph: &CampusGraph,
    ) -> Decision {
        self.pending = None;

        if let Some(candidate) = result {
            if !graph.contains(&candidate.node_id) {
                return Decision::Reject(RejectReason::UnknownNode(candidate.node_id.clone()));
            }
        }

        let decision = arbitrate(result, self.threshold);
        if let Decision::Pending(candidate) = &decision {
            self.pending = Some(PendingDetection {
                role: self.role,
                generation,
                result: candidate.clone(),
            });
        }
        decision
    }

    /// User said yes.
    pub fn confirm(&mut self) -> Option<PendingDetection> {
        self.pending.take()
    }

    /// User said no; the candidate is discarded.
    pub fn dismiss(&mut self) -> Option<PendingDetection> {
        self.pending.take()
    }
}
