use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};

use crate::arbiter::{Decision, DetectionArbiter, PendingDetection, RejectReason};
use crate::capture::{CaptureSettings, CapturedFrame, FrameGuard};
use crate::error::NavigationError;
use crate::graph::CampusGraph;
use crate::models::{ArrivalVerdict, DetectionResult, DetectionRole, NodeId};
use crate::services::Collaborators;
use crate::settings::NavigatorSettings;

use super::events::NavigationEvent;
use super::feedback::{FeedbackLog, FeedbackMessage, MessageRole};
use super::state::{ArrivalOutcome, NavPhase, NavigationSession, RouteOutcome};
use super::steps::{build_steps, NavigationStep};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

const EVENT_CAPACITY: usize = 64;
const NOT_SURE_LOCATE: &str =
    "I'm not sure where you are. Try to get a clearer view of a building sign or unique architecture.";
const NOT_SURE_DESTINATION: &str =
    "I couldn't tell which building that is. Try pointing the camera at its entrance or name board.";
const GUIDANCE_FALLBACK: &str = "Stay safe and follow the visible path indicators.";
const GUIDANCE_EMPTY: &str = "Just follow the arrows!";

/// Everything the overlay needs to render one frame of UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationSnapshot {
    pub session: NavigationSession,
    pub steps: Vec<NavigationStep>,
    pub current_step: Option<NavigationStep>,
    pub pending: Vec<PendingDetection>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    Accepted(NodeId),
    PendingConfirmation(DetectionResult),
    Rejected(RejectReason),
    /// Same view as a frame that was just rejected; the classifier was not called.
    Duplicate,
    /// A newer capture or a reset superseded this one.
    Stale,
}

struct NavigatorState {
    session: NavigationSession,
    locate: DetectionArbiter,
    destination: DetectionArbiter,
    locate_guard: FrameGuard,
    destination_guard: FrameGuard,
    feedback: FeedbackLog,
    settings: NavigatorSettings,
}

impl NavigatorState {
    fn new(settings: NavigatorSettings) -> Self {
        Self {
            session: NavigationSession::new(),
            locate: DetectionArbiter::new(DetectionRole::Locate, settings.arbiter.locate_threshold),
            destination: DetectionArbiter::new(
                DetectionRole::Destination,
                settings.arbiter.destination_threshold,
            ),
            locate_guard: FrameGuard::new(&settings.capture),
            destination_guard: FrameGuard::new(&settings.capture),
            feedback: FeedbackLog::default(),
            settings,
        }
    }

    fn arbiter_mut(&mut self, role: DetectionRole) -> &mut DetectionArbiter {
        match role {
            DetectionRole::Locate => &mut self.locate,
            DetectionRole::Destination => &mut self.destination,
        }
    }

    fn guard(&self, role: DetectionRole) -> &FrameGuard {
        match role {
            DetectionRole::Locate => &self.locate_guard,
            DetectionRole::Destination => &self.destination_guard,
        }
    }

    fn guard_mut(&mut self, role: DetectionRole) -> &mut FrameGuard {
        match role {
            DetectionRole::Locate => &mut self.locate_guard,
            DetectionRole::Destination => &mut self.destination_guard,
        }
    }

    fn pending(&self) -> Vec<PendingDetection> {
        self.locate
            .pending()
            .into_iter()
            .chain(self.destination.pending())
            .cloned()
            .collect()
    }
}

struct GuidanceRequest {
    generation: u64,
    trip_id: Option<String>,
    path_names: Vec<String>,
}

/// Side effects collected under the lock and performed after it is released.
#[derive(Default)]
struct Effects {
    events: Vec<NavigationEvent>,
    speech: Vec<String>,
    guidance: Option<GuidanceRequest>,
}

#[derive(Clone)]
pub struct NavigationController {
    state: Arc<Mutex<NavigatorState>>,
    graph: Arc<CampusGraph>,
    services: Collaborators,
    events: broadcast::Sender<NavigationEvent>,
    debug_mode: bool,
}

impl NavigationController {
    pub fn new(graph: Arc<CampusGraph>, services: Collaborators, settings: NavigatorSettings) -> Self {
        let debug_mode = std::env::var("CAMPUS_NAV_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            state: Arc::new(Mutex::new(NavigatorState::new(settings))),
            graph,
            services,
            events,
            debug_mode,
        }
    }

    pub fn graph(&self) -> &CampusGraph {
        &self.graph
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NavigationEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> NavigationSnapshot {
        let state = self.state.lock().await;
        self.build_snapshot(&state)
    }

    pub async fn messages(&self) -> Vec<FeedbackMessage> {
        self.state.lock().await.feedback.messages()
    }

    pub async fn settings(&self) -> NavigatorSettings {
        self.state.lock().await.settings.clone()
    }

    /// Swap in new thresholds and capture parameters. In-flight requests keep
    /// the values they started with.
    pub async fn apply_settings(&self, settings: NavigatorSettings) {
        let mut state = self.state.lock().await;
        state.locate.set_threshold(settings.arbiter.locate_threshold);
        state
            .destination
            .set_threshold(settings.arbiter.destination_threshold);
        state.locate_guard = FrameGuard::new(&settings.capture);
        state.destination_guard = FrameGuard::new(&settings.capture);
        state.settings = settings;
    }

    pub async fn set_location(&self, node: NodeId) -> Result<NavigationSnapshot, NavigationError> {
        let (snapshot, effects) = {
            let mut state = self.state.lock().await;
            let mut effects = Effects::default();
            let outcome = state.session.set_location(&self.graph, node)?;
            state.locate.supersede();
            self.after_route_change(&mut state, outcome, &mut effects);
            (self.state_changed(&state, &mut effects), effects)
        };
        self.flush(effects);
        Ok(snapshot)
    }

    pub async fn set_destination(&self, node: NodeId) -> Result<NavigationSnapshot, NavigationError> {
        let (snapshot, effects) = {
            let mut state = self.state.lock().await;
            let mut effects = Effects::default();
            let outcome = state.session.set_destination(&self.graph, node)?;
            state.destination.supersede();
            self.after_route_change(&mut state, outcome, &mut effects);
            (self.state_changed(&state, &mut effects), effects)
        };
        self.flush(effects);
        Ok(snapshot)
    }

    pub async fn advance_step(&self) -> Result<NavigationSnapshot, NavigationError> {
        let (snapshot, effects) = {
            let mut state = self.state.lock().await;
            let mut effects = Effects::default();
            state.session.advance_step()?;

            if state.session.phase == NavPhase::AwaitingArrivalCheck {
                let name = self.destination_name(&state.session);
                self.say(
                    &mut state,
                    &mut effects,
                    format!("You should be at the {name}. Point the camera at it to confirm."),
                );
            } else if let Some(step) = self.current_step(&state.session) {
                self.speak(&state, &mut effects, step.instruction);
            }
            (self.state_changed(&state, &mut effects), effects)
        };
        self.flush(effects);
        Ok(snapshot)
    }

    /// Back to `Idle` from any phase. Responses still in flight are discarded
    /// when they return.
    pub async fn reset(&self) -> NavigationSnapshot {
        let (snapshot, effects) = {
            let mut state = self.state.lock().await;
            let mut effects = Effects::default();
            state.session.reset();
            state.locate.supersede();
            state.destination.supersede();
            state.locate_guard.clear();
            state.destination_guard.clear();
            log_info!("navigation reset");
            (self.state_changed(&state, &mut effects), effects)
        };
        self.flush(effects);
        snapshot
    }

    /// Log a message typed by the user. Session state is untouched.
    pub async fn post_message(&self, text: &str) -> Result<NavigationSnapshot, NavigationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NavigationError::EmptyMessage);
        }
        let (snapshot, effects) = {
            let mut state = self.state.lock().await;
            let mut effects = Effects::default();
            let message = state.feedback.push(MessageRole::User, text);
            effects.events.push(NavigationEvent::Feedback { message });
            (self.build_snapshot(&state), effects)
        };
        self.flush(effects);
        Ok(snapshot)
    }

    /// Accept the low-confidence candidate awaiting confirmation for `role`.
    pub async fn confirm_pending(
        &self,
        role: DetectionRole,
    ) -> Result<NavigationSnapshot, NavigationError> {
        let (snapshot, effects) = {
            let mut state = self.state.lock().await;
            let mut effects = Effects::default();
            let pending = state
                .arbiter_mut(role)
                .confirm()
                .ok_or(NavigationError::NothingPending(role))?;
            self.apply_detection(&mut state, &mut effects, role, &pending.result)?;
            (self.state_changed(&state, &mut effects), effects)
        };
        self.flush(effects);
        Ok(snapshot)
    }

    pub async fn dismiss_pending(
        &self,
        role: DetectionRole,
    ) -> Result<NavigationSnapshot, NavigationError> {
        let (snapshot, effects) = {
            let mut state = self.state.lock().await;
            let mut effects = Effects::default();
            state
                .arbiter_mut(role)
                .dismiss()
                .ok_or(NavigationError::NothingPending(role))?;
            self.say(&mut state, &mut effects, not_sure(role));
            (self.state_changed(&state, &mut effects), effects)
        };
        self.flush(effects);
        Ok(snapshot)
    }

    /// Run a camera frame through the classifier for `role`.
    ///
    /// The session lock is released while the frame is decoded and while the
    /// classifier runs. The result is applied only if no newer capture for the
    /// same role, manual override or reset happened in the meantime.
    pub async fn submit_capture(&self, role: DetectionRole, bytes: Vec<u8>) -> Result<CaptureOutcome> {
        let (generation, capture) = {
            let mut state = self.state.lock().await;
            state.arbiter_mut(role).supersede();
            let generation = state.session.fences.for_role_mut(role).issue();
            (generation, state.settings.capture.clone())
        };
        log_debug!("{} capture #{} submitted ({} bytes)", role.as_str(), generation, bytes.len());

        let frame = match prepare_frame(bytes, capture).await? {
            Ok(frame) => frame,
            Err(err) => {
                log_warn!("{} capture #{} could not be decoded: {err:?}", role.as_str(), generation);
                return self
                    .finish_rejected(role, generation, RejectReason::DetectionFailure)
                    .await;
            }
        };

        {
            let mut state = self.state.lock().await;
            if !state.session.fences.for_role(role).is_current(generation) {
                return Ok(CaptureOutcome::Stale);
            }
            if state.guard(role).is_duplicate(&frame.phash) {
                log_info!("{} capture #{} matches the last rejected view", role.as_str(), generation);
                let mut effects = Effects::default();
                self.say(&mut state, &mut effects, not_sure(role));
                drop(state);
                self.flush(effects);
                return Ok(CaptureOutcome::Duplicate);
            }
        }

        let result = match self.services.classifier.classify(&frame, role).await {
            Ok(result) => result,
            Err(err) => {
                log_error!("{} classification failed: {err:?}", role.as_str());
                None
            }
        };

        let (outcome, effects) = {
            let mut state = self.state.lock().await;
            if !state.session.fences.for_role(role).is_current(generation) {
                log_info!("dropping stale {} result #{}", role.as_str(), generation);
                return Ok(CaptureOutcome::Stale);
            }

            let mut effects = Effects::default();
            let decision = state
                .arbiter_mut(role)
                .decide(generation, result.as_ref(), &self.graph);

            let outcome = match decision {
                Decision::Accept(node) => {
                    state.guard_mut(role).clear();
                    let accepted = result
                        .clone()
                        .unwrap_or_else(|| DetectionResult::new(node.clone(), 1.0, ""));
                    self.apply_detection(&mut state, &mut effects, role, &accepted)?;
                    CaptureOutcome::Accepted(node)
                }
                Decision::Pending(candidate) => {
                    let name = self.graph.display_name(&candidate.node_id);
                    let percent = (candidate.confidence * 100.0).round();
                    self.say(
                        &mut state,
                        &mut effects,
                        format!("I think this is the {name}, but I'm only {percent}% sure. Is that right?"),
                    );
                    if let Some(pending) = state.arbiter_mut(role).pending().cloned() {
                        effects
                            .events
                            .push(NavigationEvent::ConfirmationRequested { pending });
                    }
                    CaptureOutcome::PendingConfirmation(candidate)
                }
                Decision::Reject(reason) => {
                    log_info!("{} capture #{} rejected: {:?}", role.as_str(), generation, reason);
                    state.guard_mut(role).record_rejection(frame.phash.clone());
                    self.say(&mut state, &mut effects, not_sure(role));
                    CaptureOutcome::Rejected(reason)
                }
            };

            self.state_changed(&state, &mut effects);
            (outcome, effects)
        };

        self.flush(effects);
        Ok(outcome)
    }

    /// Ask the verifier whether the frame shows the destination.
    pub async fn verify_arrival(&self, bytes: Vec<u8>) -> Result<ArrivalOutcome> {
        let (generation, destination_name, capture, threshold) = {
            let mut state = self.state.lock().await;
            let generation = state.session.begin_arrival_check()?;
            let name = self.destination_name(&state.session);
            let mut effects = Effects::default();
            self.state_changed(&state, &mut effects);
            let capture = state.settings.capture.clone();
            let threshold = state.settings.arbiter.arrival_threshold;
            drop(state);
            self.flush(effects);
            (generation, name, capture, threshold)
        };

        let verdict = match prepare_frame(bytes, capture).await? {
            Ok(frame) => match self
                .services
                .verifier
                .verify_arrival(&frame, &destination_name)
                .await
            {
                Ok(verdict) => verdict,
                Err(err) => {
                    log_error!("arrival verification failed: {err:?}");
                    ArrivalVerdict::not_arrived()
                }
            },
            Err(err) => {
                log_warn!("arrival frame could not be decoded: {err:?}");
                ArrivalVerdict::not_arrived()
            }
        };

        let (outcome, effects) = {
            let mut state = self.state.lock().await;
            let outcome = state
                .session
                .verify_arrival_fenced(generation, verdict, threshold)?;

            if outcome == ArrivalOutcome::Stale {
                log_info!("dropping stale arrival verdict #{}", generation);
                return Ok(outcome);
            }

            let mut effects = Effects::default();
            match &outcome {
                ArrivalOutcome::Arrived(node) => {
                    log_info!("arrived at {}", node);
                    let name = self.graph.display_name(node);
                    effects.events.push(NavigationEvent::Arrived { node: node.clone() });
                    self.say(&mut state, &mut effects, format!("You have arrived at the {name}!"));
                }
                ArrivalOutcome::Retry => {
                    self.say(
                        &mut state,
                        &mut effects,
                        format!(
                            "This doesn't look like the {destination_name} yet. Keep following the arrows and try again."
                        ),
                    );
                }
                ArrivalOutcome::Stale => {}
            }
            self.state_changed(&state, &mut effects);
            (outcome, effects)
        };

        self.flush(effects);
        Ok(outcome)
    }

    async fn finish_rejected(
        &self,
        role: DetectionRole,
        generation: u64,
        reason: RejectReason,
    ) -> Result<CaptureOutcome> {
        let effects = {
            let mut state = self.state.lock().await;
            if !state.session.fences.for_role(role).is_current(generation) {
                return Ok(CaptureOutcome::Stale);
            }
            let mut effects = Effects::default();
            self.say(&mut state, &mut effects, not_sure(role));
            self.state_changed(&state, &mut effects);
            effects
        };
        self.flush(effects);
        Ok(CaptureOutcome::Rejected(reason))
    }

    fn apply_detection(
        &self,
        state: &mut NavigatorState,
        effects: &mut Effects,
        role: DetectionRole,
        detection: &DetectionResult,
    ) -> Result<(), NavigationError> {
        let node = detection.node_id.clone();
        let name = self.graph.display_name(&node);
        let outcome = match role {
            DetectionRole::Locate => state.session.set_location(&self.graph, node)?,
            DetectionRole::Destination => state.session.set_destination(&self.graph, node)?,
        };

        let text = match role {
            DetectionRole::Locate => format!("Identified your location: {name}."),
            DetectionRole::Destination => format!("Destination set: {name}."),
        };
        let text = if detection.rationale.trim().is_empty() {
            text
        } else {
            format!("{text} {}", detection.rationale.trim())
        };
        self.say(state, effects, text);
        self.after_route_change(state, outcome, effects);
        Ok(())
    }

    fn after_route_change(&self, state: &mut NavigatorState, outcome: RouteOutcome, effects: &mut Effects) {
        match outcome {
            RouteOutcome::Routed {
                trip_id,
                distance,
                generation,
            } => {
                let path_names: Vec<String> = state
                    .session
                    .path
                    .iter()
                    .map(|id| self.graph.display_name(id))
                    .collect();
                log_info!(
                    "trip {} routed: {} ({:.0}m)",
                    trip_id,
                    path_names.join(" -> "),
                    distance
                );
                if let Some(step) = self.current_step(&state.session) {
                    self.speak(state, effects, step.instruction);
                }
                effects.guidance = Some(GuidanceRequest {
                    generation,
                    trip_id: Some(trip_id),
                    path_names,
                });
            }
            RouteOutcome::Unreachable { from, to } => {
                log_warn!("no route from {} to {}", from, to);
                let text = format!(
                    "I couldn't find a path from the {} to the {}.",
                    self.graph.display_name(&from),
                    self.graph.display_name(&to)
                );
                effects
                    .events
                    .push(NavigationEvent::RouteUnreachable { from, to });
                self.say(state, effects, text);
            }
            RouteOutcome::Waiting | RouteOutcome::Unchanged => {}
        }
    }

    fn build_snapshot(&self, state: &NavigatorState) -> NavigationSnapshot {
        let steps = build_steps(&self.graph, &state.session.path);
        let current_step = steps.get(state.session.step_index).cloned();
        NavigationSnapshot {
            session: state.session.clone(),
            steps,
            current_step,
            pending: state.pending(),
        }
    }

    fn state_changed(&self, state: &NavigatorState, effects: &mut Effects) -> NavigationSnapshot {
        let snapshot = self.build_snapshot(state);
        if self.debug_mode {
            log_info!(
                "[debug] phase={:?} location={:?} destination={:?} step={}/{}",
                snapshot.session.phase,
                snapshot.session.current_location,
                snapshot.session.destination,
                snapshot.session.step_index,
                snapshot.steps.len()
            );
        }
        effects.events.push(NavigationEvent::StateChanged {
            snapshot: snapshot.clone(),
        });
        snapshot
    }

    fn current_step(&self, session: &NavigationSession) -> Option<NavigationStep> {
        build_steps(&self.graph, &session.path)
            .into_iter()
            .nth(session.step_index)
    }

    fn destination_name(&self, session: &NavigationSession) -> String {
        session
            .destination
            .as_ref()
            .map(|id| self.graph.display_name(id))
            .unwrap_or_else(|| "destination".to_string())
    }

    /// Log an assistant message and, if enabled, read it out.
    fn say(&self, state: &mut NavigatorState, effects: &mut Effects, text: impl Into<String>) {
        let message = state.feedback.assistant(text);
        self.speak(state, effects, message.text.clone());
        effects.events.push(NavigationEvent::Feedback { message });
    }

    fn speak(&self, state: &NavigatorState, effects: &mut Effects, text: String) {
        if state.settings.speech_enabled {
            effects.speech.push(text);
        }
    }

    fn flush(&self, effects: Effects) {
        for event in effects.events {
            log_debug!("emit {}", event.name());
            // No subscribers is fine.
            let _ = self.events.send(event);
        }

        for text in effects.speech {
            let speech = self.services.speech.clone();
            let events = self.events.clone();
            tokio::spawn(async move {
                match speech.speak(&text).await {
                    Ok(audio) => {
                        let _ = events.send(NavigationEvent::Speech { text, audio });
                    }
                    Err(err) => log_warn!("speech synthesis failed: {err:?}"),
                }
            });
        }

        if let Some(request) = effects.guidance {
            let controller = self.clone();
            tokio::spawn(async move {
                controller.fetch_guidance(request).await;
            });
        }
    }

    async fn fetch_guidance(&self, request: GuidanceRequest) {
        let verbose = self.state.lock().await.settings.verbose_instructions;
        let lines = match self
            .services
            .instructions
            .instructions(&request.path_names, verbose)
            .await
        {
            Ok(lines) if lines.iter().all(|line| line.trim().is_empty()) => {
                vec![GUIDANCE_EMPTY.to_string()]
            }
            Ok(lines) => lines,
            Err(err) => {
                log_warn!("route advice failed: {err:?}");
                vec![GUIDANCE_FALLBACK.to_string()]
            }
        };

        let effects = {
            let mut state = self.state.lock().await;
            if !state.session.apply_guidance(request.generation, lines.clone()) {
                log_debug!("dropping stale guidance for route #{}", request.generation);
                return;
            }
            let mut effects = Effects::default();
            let message = state.feedback.assistant(lines.join("\n"));
            effects.events.push(NavigationEvent::Feedback { message });
            effects.events.push(NavigationEvent::GuidanceReady {
                trip_id: request.trip_id,
                lines,
            });
            self.state_changed(&state, &mut effects);
            effects
        };
        self.flush(effects);
    }
}

fn not_sure(role: DetectionRole) -> &'static str {
    match role {
        DetectionRole::Locate => NOT_SURE_LOCATE,
        DetectionRole::Destination => NOT_SURE_DESTINATION,
    }
}

/// Outer error is a worker failure, inner one a bad frame.
async fn prepare_frame(bytes: Vec<u8>, settings: CaptureSettings) -> Result<Result<CapturedFrame>> {
    tokio::task::spawn_blocking(move || CapturedFrame::prepare(&bytes, &settings))
        .await
        .context("frame preparation worker join failed")
}
