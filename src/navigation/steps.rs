use serde::{Deserialize, Serialize};

use crate::graph::CampusGraph;
use crate::models::NodeId;

/// Turns sharper than this (degrees) get a left/right arrow.
const TURN_THRESHOLD_DEG: f64 = 30.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StepDirection {
    Left,
    Right,
    Straight,
    Arrive,
}

/// One entry of the overlay's step list. Step `i` walks from `path[i]` to
/// `path[i + 1]`; the last step is the arrival marker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NavigationStep {
    pub index: usize,
    pub instruction: String,
    pub direction: StepDirection,
    /// Metres for this hop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Edge micro-instruction, e.g. "take the stairs".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub fn build_steps(graph: &CampusGraph, path: &[NodeId]) -> Vec<NavigationStep> {
    if path.is_empty() {
        return Vec::new();
    }

    let mut steps = Vec::with_capacity(path.len());
    for (index, pair) in path.windows(2).enumerate() {
        let edge = graph.edge_between(&pair[0], &pair[1]);
        let direction = if index == 0 {
            StepDirection::Straight
        } else {
            turn_direction(graph, &path[index - 1], &pair[0], &pair[1])
        };

        steps.push(NavigationStep {
            index,
            instruction: format!("Head towards the {}", graph.display_name(&pair[1])),
            direction,
            distance: edge.map(|edge| edge.distance),
            note: edge.and_then(|edge| edge.instruction.clone()),
        });
    }

    steps.push(NavigationStep {
        index: path.len() - 1,
        instruction: "You have arrived at your destination!".to_string(),
        direction: StepDirection::Arrive,
        distance: None,
        note: None,
    });

    steps
}

/// Arrow for the turn at `via`, using map coordinates (y grows downwards).
fn turn_direction(graph: &CampusGraph, from: &NodeId, via: &NodeId, to: &NodeId) -> StepDirection {
    let (Some(a), Some(b), Some(c)) = (graph.node(from), graph.node(via), graph.node(to)) else {
        return StepDirection::Straight;
    };

    let incoming = (b.x - a.x, b.y - a.y);
    let outgoing = (c.x - b.x, c.y - b.y);
    let cross = incoming.0 * outgoing.1 - incoming.1 * outgoing.0;
    let dot = incoming.0 * outgoing.0 + incoming.1 * outgoing.1;
    if cross == 0.0 && dot == 0.0 {
        return StepDirection::Straight;
    }

    let angle = cross.atan2(dot).to_degrees();
    if angle.abs() < TURN_THRESHOLD_DEG {
        StepDirection::Straight
    } else if angle > 0.0 {
        StepDirection::Right
    } else {
        StepDirection::Left
    }
}
