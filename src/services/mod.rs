//! Narrow contracts for the external collaborators: the image model, the
//! arrival check, route advice and speech. Implementations live outside this
//! crate; [`local`] has the offline defaults.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::capture::CapturedFrame;
use crate::models::{ArrivalVerdict, DetectionResult, DetectionRole};

pub mod local;
pub mod prompt;
pub mod response;

pub use local::{NoSpeech, TemplateInstructions};

#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// `Ok(None)` when the model could not name any campus node.
    async fn classify(
        &self,
        frame: &CapturedFrame,
        role: DetectionRole,
    ) -> Result<Option<DetectionResult>>;
}

#[async_trait]
pub trait ArrivalVerifier: Send + Sync {
    async fn verify_arrival(
        &self,
        frame: &CapturedFrame,
        destination_name: &str,
    ) -> Result<ArrivalVerdict>;
}

#[async_trait]
pub trait InstructionGenerator: Send + Sync {
    async fn instructions(&self, path_names: &[String], verbose: bool) -> Result<Vec<String>>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Fire-and-forget; `Ok(None)` means the backend played it itself.
    async fn speak(&self, text: &str) -> Result<Option<Vec<u8>>>;
}

#[derive(Clone)]
pub struct Collaborators {
    pub classifier: Arc<dyn ImageClassifier>,
    pub verifier: Arc<dyn ArrivalVerifier>,
    pub instructions: Arc<dyn InstructionGenerator>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

impl Collaborators {
    /// Classifier and verifier are mandatory; advice and speech fall back to
    /// the local implementations.
    pub fn new(classifier: Arc<dyn ImageClassifier>, verifier: Arc<dyn ArrivalVerifier>) -> Self {
        Self {
            classifier,
            verifier,
            instructions: Arc::new(TemplateInstructions),
            speech: Arc::new(NoSpeech),
        }
    }

    pub fn with_instructions(mut self, instructions: Arc<dyn InstructionGenerator>) -> Self {
        self.instructions = instructions;
        self
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        self.speech = speech;
        self
    }
}
