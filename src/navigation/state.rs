use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::NavigationError;
use crate::graph::{route_with_distance, CampusGraph};
use crate::models::{ArrivalVerdict, NodeId};

use super::fence::Fences;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NavPhase {
    /// No route: destination unset, or location still unknown.
    Idle,
    Routing,
    InTransit,
    AwaitingArrivalCheck,
    Arrived,
    /// Both endpoints known but the router found no path.
    Unreachable,
}

impl Default for NavPhase {
    fn default() -> Self {
        NavPhase::Idle
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ArrivalStatus {
    None,
    Verifying,
    Confirmed,
}

impl Default for ArrivalStatus {
    fn default() -> Self {
        ArrivalStatus::None
    }
}

/// What a location/destination write did to the route.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// A fresh path was computed. `generation` fences the guidance fetch.
    Routed {
        trip_id: String,
        distance: f64,
        generation: u64,
    },
    Unreachable {
        from: NodeId,
        to: NodeId,
    },
    /// Only one endpoint is known so far.
    Waiting,
    /// Same node as before; progress kept.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrivalOutcome {
    Arrived(NodeId),
    /// Still awaiting a convincing arrival check.
    Retry,
    /// A newer verification or a reset superseded this one.
    Stale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSession {
    pub phase: NavPhase,
    pub current_location: Option<NodeId>,
    pub destination: Option<NodeId>,
    /// Empty, or runs from `current_location` to `destination`.
    pub path: Vec<NodeId>,
    pub step_index: usize,
    pub arrival_status: ArrivalStatus,
    pub trip_id: Option<String>,
    pub route_distance: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
    pub last_arrival: Option<NodeId>,
    pub arrived_at: Option<DateTime<Utc>>,
    /// Route advice from the instruction generator for the current path.
    pub guidance: Vec<String>,
    #[serde(skip)]
    pub(crate) fences: Fences,
}

impl Default for NavigationSession {
    fn default() -> Self {
        Self {
            phase: NavPhase::Idle,
            current_location: None,
            destination: None,
            path: Vec::new(),
            step_index: 0,
            arrival_status: ArrivalStatus::None,
            trip_id: None,
            route_distance: None,
            started_at: None,
            last_arrival: None,
            arrived_at: None,
            guidance: Vec::new(),
            fences: Fences::default(),
        }
    }
}

impl NavigationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fences(&self) -> &Fences {
        &self.fences
    }

    pub fn last_step_index(&self) -> Option<usize> {
        self.path.len().checked_sub(1)
    }

    /// Overwrite the current location. Recomputes the route when a destination
    /// is set, including mid-transit.
    pub fn set_location(
        &mut self,
        graph: &CampusGraph,
        node: NodeId,
    ) -> Result<RouteOutcome, NavigationError> {
        if !graph.contains(&node) {
            return Err(NavigationError::UnknownNode(node));
        }

        self.fences.location.invalidate();
        if self.current_location.as_ref() == Some(&node) {
            return Ok(RouteOutcome::Unchanged);
        }

        self.current_location = Some(node);
        if self.destination.is_some() {
            Ok(self.recompute(graph))
        } else {
            Ok(RouteOutcome::Waiting)
        }
    }

    pub fn set_destination(
        &mut self,
        graph: &CampusGraph,
        node: NodeId,
    ) -> Result<RouteOutcome, NavigationError> {
        if !graph.contains(&node) {
            return Err(NavigationError::UnknownNode(node));
        }

        if self.phase == NavPhase::Arrived {
            self.clear_trip();
        }

        self.fences.destination.invalidate();
        if self.destination.as_ref() == Some(&node) && self.phase != NavPhase::Idle {
            return Ok(RouteOutcome::Unchanged);
        }

        self.destination = Some(node);
        if self.current_location.is_some() {
            Ok(self.recompute(graph))
        } else {
            self.phase = NavPhase::Idle;
            Ok(RouteOutcome::Waiting)
        }
    }

    fn recompute(&mut self, graph: &CampusGraph) -> RouteOutcome {
        let (Some(from), Some(to)) = (self.current_location.clone(), self.destination.clone())
        else {
            return RouteOutcome::Waiting;
        };

        self.phase = NavPhase::Routing;
        self.step_index = 0;
        self.arrival_status = ArrivalStatus::None;
        self.guidance.clear();
        let generation = self.fences.route.issue();
        // A verification for the old path must not land on the new one.
        self.fences.arrival.invalidate();

        match route_with_distance(graph, &from, &to) {
            Some(route) => {
                let trip_id = Uuid::new_v4().to_string();
                self.phase = if route.nodes.len() == 1 {
                    NavPhase::AwaitingArrivalCheck
                } else {
                    NavPhase::InTransit
                };
                self.path = route.nodes;
                self.route_distance = Some(route.distance);
                self.trip_id = Some(trip_id.clone());
                self.started_at = Some(Utc::now());
                RouteOutcome::Routed {
                    trip_id,
                    distance: route.distance,
                    generation,
                }
            }
            None => {
                self.phase = NavPhase::Unreachable;
                self.path.clear();
                self.route_distance = None;
                self.trip_id = None;
                self.started_at = None;
                RouteOutcome::Unreachable { from, to }
            }
        }
    }

    /// Move to the next step. Only valid while in transit.
    pub fn advance_step(&mut self) -> Result<usize, NavigationError> {
        if self.phase != NavPhase::InTransit {
            return Err(NavigationError::invalid("advance step", self.phase));
        }
        let Some(last) = self.last_step_index() else {
            return Err(NavigationError::invalid("advance step", self.phase));
        };

        self.step_index = (self.step_index + 1).min(last);
        if self.step_index == last {
            self.phase = NavPhase::AwaitingArrivalCheck;
        }
        Ok(self.step_index)
    }

    /// Mark an arrival check as in flight and return its generation.
    pub fn begin_arrival_check(&mut self) -> Result<u64, NavigationError> {
        if self.phase != NavPhase::AwaitingArrivalCheck {
            return Err(NavigationError::invalid("verify arrival", self.phase));
        }
        self.arrival_status = ArrivalStatus::Verifying;
        Ok(self.fences.arrival.issue())
    }

    /// Apply an arrival verdict. `confidence` must be strictly above `threshold`.
    pub fn verify_arrival(
        &mut self,
        verdict: ArrivalVerdict,
        threshold: f64,
    ) -> Result<ArrivalOutcome, NavigationError> {
        if self.phase != NavPhase::AwaitingArrivalCheck {
            return Err(NavigationError::invalid("verify arrival", self.phase));
        }

        if verdict.arrived && verdict.confidence > threshold {
            let Some(destination) = self.destination.take() else {
                return Err(NavigationError::invalid("verify arrival", self.phase));
            };
            self.current_location = Some(destination.clone());
            self.last_arrival = Some(destination.clone());
            self.arrived_at = Some(Utc::now());
            self.path.clear();
            self.step_index = 0;
            self.guidance.clear();
            self.arrival_status = ArrivalStatus::Confirmed;
            self.phase = NavPhase::Arrived;
            self.fences.route.invalidate();
            Ok(ArrivalOutcome::Arrived(destination))
        } else {
            self.arrival_status = ArrivalStatus::None;
            Ok(ArrivalOutcome::Retry)
        }
    }

    /// Apply a fenced arrival verdict coming back from the verifier.
    pub fn verify_arrival_fenced(
        &mut self,
        generation: u64,
        verdict: ArrivalVerdict,
        threshold: f64,
    ) -> Result<ArrivalOutcome, NavigationError> {
        if !self.fences.arrival.is_current(generation) {
            return Ok(ArrivalOutcome::Stale);
        }
        self.verify_arrival(verdict, threshold)
    }

    /// Store route advice if it still belongs to the current path.
    pub fn apply_guidance(&mut self, generation: u64, lines: Vec<String>) -> bool {
        if !self.fences.route.is_current(generation) || self.path.is_empty() {
            return false;
        }
        self.guidance = lines;
        true
    }

    /// Back to `Idle`. The current location survives; everything in flight is dropped.
    pub fn reset(&mut self) {
        self.clear_trip();
        self.fences.location.invalidate();
    }

    /// Drop the trip (destination, path, progress) and every request tied to
    /// it. Location requests stay valid.
    pub fn clear_trip(&mut self) {
        self.phase = NavPhase::Idle;
        self.destination = None;
        self.path.clear();
        self.step_index = 0;
        self.arrival_status = ArrivalStatus::None;
        self.trip_id = None;
        self.route_distance = None;
        self.started_at = None;
        self.guidance.clear();
        self.fences.destination.invalidate();
        self.fences.arrival.invalidate();
        self.fences.route.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> NodeId {
        NodeId::from(value)
    }

    fn assert_path_invariant(session: &NavigationSession) {
        if let (Some(first), Some(last)) = (session.path.first(), session.path.last()) {
            assert_eq!(Some(first), session.current_location.as_ref());
            assert_eq!(Some(last), session.destination.as_ref());
        }
    }

    fn in_transit(graph: &CampusGraph) -> NavigationSession {
        let mut session = NavigationSession::new();
        session.set_location(graph, id("gate")).unwrap();
        session.set_destination(graph, id("library")).unwrap();
        session
    }

    #[test]
    fn test_routing_requires_both_endpoints() {
        let graph = CampusGraph::builtin();
        let mut session = NavigationSession::new();

        assert_eq!(
            session.set_destination(&graph, id("library")).unwrap(),
            RouteOutcome::Waiting
        );
        assert_eq!(session.phase, NavPhase::Idle);
        assert!(session.path.is_empty());

        let outcome = session.set_location(&graph, id("gate")).unwrap();
        assert!(matches!(outcome, RouteOutcome::Routed { distance, .. } if distance == 350.0));
        assert_eq!(session.phase, NavPhase::InTransit);
        assert_eq!(session.path, vec![id("gate"), id("admin"), id("library")]);
        assert!(session.trip_id.is_some());
        assert_path_invariant(&session);
    }

    #[test]
    fn test_unknown_node_leaves_state_alone() {
        let graph = CampusGraph::builtin();
        let mut session = in_transit(&graph);
        let err = session.set_destination(&graph, id("gym")).unwrap_err();
        assert_eq!(err, NavigationError::UnknownNode(id("gym")));
        assert_eq!(session.destination, Some(id("library")));
        assert_eq!(session.phase, NavPhase::InTransit);
    }

    #[test]
    fn test_advance_until_arrival_check() {
        let graph = CampusGraph::builtin();
        let mut session = in_transit(&graph);

        assert_eq!(session.advance_step().unwrap(), 1);
        assert_eq!(session.phase, NavPhase::InTransit);
        assert_eq!(session.advance_step().unwrap(), 2);
        assert_eq!(session.phase, NavPhase::AwaitingArrivalCheck);

        // Past the last index: rejected, nothing moves.
        assert!(session.advance_step().unwrap_err().is_invalid_transition());
        assert_eq!(session.step_index, 2);
    }

    #[test]
    fn test_advance_rejected_from_idle_and_arrived() {
        let graph = CampusGraph::builtin();
        let mut session = NavigationSession::new();
        assert!(session.advance_step().is_err());
        assert_eq!(session.step_index, 0);

        session.set_location(&graph, id("gate")).unwrap();
        session.set_destination(&graph, id("gate")).unwrap();
        assert_eq!(session.phase, NavPhase::AwaitingArrivalCheck);
        session
            .verify_arrival(ArrivalVerdict { arrived: true, confidence: 0.9 }, 0.7)
            .unwrap();
        assert_eq!(session.phase, NavPhase::Arrived);

        let before = session.clone();
        assert!(session.advance_step().is_err());
        assert_eq!(session.step_index, before.step_index);
        assert_eq!(session.phase, NavPhase::Arrived);
    }

    #[test]
    fn test_same_node_route_is_single_step() {
        let graph = CampusGraph::builtin();
        let mut session = NavigationSession::new();
        session.set_location(&graph, id("canteen")).unwrap();
        session.set_destination(&graph, id("canteen")).unwrap();
        assert_eq!(session.path, vec![id("canteen")]);
        assert_eq!(session.phase, NavPhase::AwaitingArrivalCheck);
    }

    #[test]
    fn test_relocation_mid_transit_recomputes() {
        let graph = CampusGraph::builtin();
        let mut session = in_transit(&graph);
        session.advance_step().unwrap();
        let old_trip = session.trip_id.clone();

        session.set_location(&graph, id("blockA")).unwrap();
        assert_eq!(session.path, vec![id("blockA"), id("library")]);
        assert_eq!(session.step_index, 0);
        assert_eq!(session.phase, NavPhase::InTransit);
        assert_ne!(session.trip_id, old_trip);
        assert_path_invariant(&session);
    }

    #[test]
    fn test_repeat_location_keeps_progress() {
        let graph = CampusGraph::builtin();
        let mut session = in_transit(&graph);
        session.advance_step().unwrap();

        assert_eq!(
            session.set_location(&graph, id("gate")).unwrap(),
            RouteOutcome::Unchanged
        );
        assert_eq!(session.step_index, 1);
    }

    /// Built-in campus with the main gate cut off.
    fn gateless_graph() -> CampusGraph {
        let nodes = CampusGraph::builtin().nodes().to_vec();
        let edges = CampusGraph::builtin()
            .edges()
            .iter()
            .filter(|edge| edge.from.as_str() != "gate" && edge.to.as_str() != "gate")
            .cloned()
            .collect();
        CampusGraph::new(nodes, edges).unwrap()
    }

    #[test]
    fn test_unreachable_destination_clears_path() {
        let graph = gateless_graph();

        let mut session = NavigationSession::new();
        session.set_location(&graph, id("admin")).unwrap();
        session.set_destination(&graph, id("library")).unwrap();
        assert!(!session.path.is_empty());

        let outcome = session.set_destination(&graph, id("gate")).unwrap();
        assert_eq!(
            outcome,
            RouteOutcome::Unreachable {
                from: id("admin"),
                to: id("gate")
            }
        );
        assert_eq!(session.phase, NavPhase::Unreachable);
        assert!(session.path.is_empty());
        assert!(session.trip_id.is_none());
        assert!(session.advance_step().is_err());
    }

    #[test]
    fn test_arrival_needs_confidence_above_threshold() {
        let graph = CampusGraph::builtin();
        let mut session = in_transit(&graph);
        session.advance_step().unwrap();
        session.advance_step().unwrap();

        let generation = session.begin_arrival_check().unwrap();
        assert_eq!(session.arrival_status, ArrivalStatus::Verifying);
        let outcome = session
            .verify_arrival_fenced(generation, ArrivalVerdict { arrived: true, confidence: 0.7 }, 0.7)
            .unwrap();
        assert_eq!(outcome, ArrivalOutcome::Retry);
        assert_eq!(session.phase, NavPhase::AwaitingArrivalCheck);
        assert_eq!(session.arrival_status, ArrivalStatus::None);

        let outcome = session
            .verify_arrival(ArrivalVerdict { arrived: true, confidence: 0.95 }, 0.7)
            .unwrap();
        assert_eq!(outcome, ArrivalOutcome::Arrived(id("library")));
        assert_eq!(session.phase, NavPhase::Arrived);
        assert_eq!(session.current_location, Some(id("library")));
        assert_eq!(session.destination, None);
        assert!(session.path.is_empty());
        assert_eq!(session.arrival_status, ArrivalStatus::Confirmed);
    }

    #[test]
    fn test_verify_arrival_rejected_outside_check() {
        let graph = CampusGraph::builtin();
        let mut session = in_transit(&graph);
        let verdict = ArrivalVerdict { arrived: true, confidence: 1.0 };
        assert!(session.verify_arrival(verdict, 0.5).is_err());
        assert!(session.begin_arrival_check().is_err());
        assert_eq!(session.phase, NavPhase::InTransit);
    }

    #[test]
    fn test_stale_arrival_verdict_is_dropped() {
        let graph = CampusGraph::builtin();
        let mut session = NavigationSession::new();
        session.set_location(&graph, id("gate")).unwrap();
        session.set_destination(&graph, id("gate")).unwrap();

        let first = session.begin_arrival_check().unwrap();
        let _second = session.begin_arrival_check().unwrap();
        let verdict = ArrivalVerdict { arrived: true, confidence: 1.0 };
        assert_eq!(
            session.verify_arrival_fenced(first, verdict, 0.5).unwrap(),
            ArrivalOutcome::Stale
        );
        assert_eq!(session.phase, NavPhase::AwaitingArrivalCheck);
    }

    #[test]
    fn test_reset_from_every_phase_keeps_location() {
        let graph = CampusGraph::builtin();
        let mut sessions = vec![NavigationSession::new(), in_transit(&graph)];

        let mut awaiting = in_transit(&graph);
        awaiting.advance_step().unwrap();
        awaiting.advance_step().unwrap();
        sessions.push(awaiting.clone());

        let mut arrived = awaiting;
        arrived
            .verify_arrival(ArrivalVerdict { arrived: true, confidence: 1.0 }, 0.5)
            .unwrap();
        sessions.push(arrived);

        let gateless = gateless_graph();
        let mut unreachable = NavigationSession::new();
        unreachable.set_location(&gateless, id("admin")).unwrap();
        unreachable.set_destination(&gateless, id("gate")).unwrap();
        assert_eq!(unreachable.phase, NavPhase::Unreachable);
        sessions.push(unreachable);

        for mut session in sessions {
            let fences = session.fences().clone();
            let location = session.current_location.clone();
            session.reset();
            assert_eq!(session.phase, NavPhase::Idle);
            assert_eq!(session.destination, None);
            assert!(session.path.is_empty());
            assert_eq!(session.step_index, 0);
            assert_eq!(session.arrival_status, ArrivalStatus::None);
            assert_eq!(session.current_location, location);
            assert!(!session.fences().location.is_current(fences.location.current()));
            assert!(!session.fences().route.is_current(fences.route.current()));
        }
    }

    #[test]
    fn test_destination_after_arrival_keeps_location_requests_valid() {
        let graph = CampusGraph::builtin();
        let mut session = NavigationSession::new();
        session.set_location(&graph, id("gate")).unwrap();
        session.set_destination(&graph, id("gate")).unwrap();
        session
            .verify_arrival(ArrivalVerdict { arrived: true, confidence: 1.0 }, 0.5)
            .unwrap();

        let locate = session.fences.location.issue();
        session.set_destination(&graph, id("library")).unwrap();
        assert!(session.fences().location.is_current(locate));

        session.reset();
        assert!(!session.fences().location.is_current(locate));
    }

    #[test]
    fn test_new_destination_after_arrival_starts_fresh_trip() {
        let graph = CampusGraph::builtin();
        let mut session = NavigationSession::new();
        session.set_location(&graph, id("gate")).unwrap();
        session.set_destination(&graph, id("gate")).unwrap();
        session
            .verify_arrival(ArrivalVerdict { arrived: true, confidence: 1.0 }, 0.5)
            .unwrap();

        session.set_destination(&graph, id("admin")).unwrap();
        assert_eq!(session.phase, NavPhase::InTransit);
        assert_eq!(session.arrival_status, ArrivalStatus::None);
        assert_eq!(session.path, vec![id("gate"), id("admin")]);
    }

    #[test]
    fn test_guidance_for_old_route_is_ignored() {
        let graph = CampusGraph::builtin();
        let mut session = NavigationSession::new();
        session.set_location(&graph, id("gate")).unwrap();
        let RouteOutcome::Routed { generation: old, .. } =
            session.set_destination(&graph, id("library")).unwrap()
        else {
            panic!("expected a route");
        };
        let RouteOutcome::Routed { generation: new, .. } =
            session.set_destination(&graph, id("canteen")).unwrap()
        else {
            panic!("expected a route");
        };

        assert!(!session.apply_guidance(old, vec!["old".into()]));
        assert!(session.guidance.is_empty());
        assert!(session.apply_guidance(new, vec!["new".into()]));
        assert_eq!(session.guidance, vec!["new".to_string()]);
    }
}
