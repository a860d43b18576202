//! Error types for campus graph construction and navigation commands.
//!
//! Detection failures, low confidence, unreachable destinations, stale
//! responses and sensor dropouts are *outcomes*, not errors: they surface as
//! arbiter decisions, session phases and neutral telemetry samples. The enums
//! here cover the cases where a caller asked for something that cannot happen.

use crate::models::{DetectionRole, NodeId};
use crate::navigation::NavPhase;

/// Errors raised while building a [`CampusGraph`](crate::graph::CampusGraph).
#[derive(Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum GraphError {
    /// A node was declared with an empty identifier.
    #[error("node at position {0} has an empty id")]
    EmptyNodeId(usize),

    /// Two nodes share the same identifier.
    #[error("duplicate node id '{0}'")]
    DuplicateNode(NodeId),

    /// An edge references a node that was never declared.
    #[error("edge {from} -> {to} references unknown node '{missing}'")]
    UnknownEndpoint {
        from: NodeId,
        to: NodeId,
        missing: NodeId,
    },

    /// An edge connects a node to itself.
    #[error("self-loop on node '{0}'")]
    SelfLoop(NodeId),

    /// Edge weights must be finite and strictly positive.
    #[error("edge {from} -> {to} has invalid distance {distance}")]
    InvalidDistance {
        from: NodeId,
        to: NodeId,
        distance: f64,
    },
}

/// Errors returned by navigation commands.
#[derive(Debug, thiserror::Error, PartialEq)]
#[non_exhaustive]
pub enum NavigationError {
    /// The command is not valid in the session's current phase. State is unchanged.
    #[error("cannot {command} while {phase:?}")]
    InvalidTransition {
        command: &'static str,
        phase: NavPhase,
    },

    /// The node id is not part of the loaded campus graph.
    #[error("unknown campus node '{0}'")]
    UnknownNode(NodeId),

    /// Confirm/dismiss was requested but no detection is awaiting confirmation.
    #[error("no {} detection is awaiting confirmation", .0.as_str())]
    NothingPending(DetectionRole),

    #[error("message text is empty")]
    EmptyMessage,
}

impl NavigationError {
    pub(crate) fn invalid(command: &'static str, phase: NavPhase) -> Self {
        Self::InvalidTransition { command, phase }
    }

    /// Returns `true` if the command was rejected because of the session phase.
    #[must_use]
    pub const fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }
}
