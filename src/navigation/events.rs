use serde::Serialize;

use crate::arbiter::PendingDetection;
use crate::models::NodeId;

use super::controller::NavigationSnapshot;
use super::feedback::FeedbackMessage;

/// Pushed to every subscriber of [`NavigationController::subscribe`](super::NavigationController::subscribe).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NavigationEvent {
    StateChanged {
        snapshot: NavigationSnapshot,
    },
    Feedback {
        message: FeedbackMessage,
    },
    ConfirmationRequested {
        pending: PendingDetection,
    },
    #[serde(rename_all = "camelCase")]
    RouteUnreachable {
        from: NodeId,
        to: NodeId,
    },
    #[serde(rename_all = "camelCase")]
    GuidanceReady {
        trip_id: Option<String>,
        lines: Vec<String>,
    },
    Arrived {
        node: NodeId,
    },
    /// Synthesized audio for `text`, when the speech backend produced any.
    Speech {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        audio: Option<Vec<u8>>,
    },
}

impl NavigationEvent {
    pub fn name(&self) -> &'static str {
        match self {
            NavigationEvent::StateChanged { .. } => "navigation-state-changed",
            NavigationEvent::Feedback { .. } => "navigation-feedback",
            NavigationEvent::ConfirmationRequested { .. } => "navigation-confirmation-requested",
            NavigationEvent::RouteUnreachable { .. } => "navigation-route-unreachable",
            NavigationEvent::GuidanceReady { .. } => "navigation-guidance-ready",
            NavigationEvent::Arrived { .. } => "navigation-arrived",
            NavigationEvent::Speech { .. } => "navigation-speech",
        }
    }
}
