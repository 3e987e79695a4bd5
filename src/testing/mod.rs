//! Scripted doubles for the external classifier and generation services.
//!
//! Responses are queued ahead of time and consumed in FIFO order; calls are
//! recorded so tests can assert on what was sent upstream.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::classifier::{ClassificationResult, ClassifierClient, PredictedClass};
use crate::error::{Error, Result};
use crate::features::DerivedFeatureSet;
use crate::generation::{GenerationClient, GenerationError};

/// A high-risk verdict fixture matching the sample metric profile.
pub fn high_risk_classification() -> ClassificationResult {
    ClassificationResult {
        predicted_class: PredictedClass::Diabetes,
        probability: 87.5,
        risk_level: "High".to_string(),
    }
}

enum ScriptedPrediction {
    Success(ClassificationResult),
    Failure(String),
}

/// Scripted classifier double.
#[derive(Default)]
pub struct MockClassifierClient {
    responses: Mutex<VecDeque<ScriptedPrediction>>,
    calls: Mutex<Vec<DerivedFeatureSet>>,
}

impl MockClassifierClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_success(&self, result: ClassificationResult) {
        self.responses
            .lock()
            .unwrap()
            .push_back(ScriptedPrediction::Success(result));
    }

    pub fn add_failure(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(ScriptedPrediction::Failure(message.to_string()));
    }

    /// Feature sets received so far, in call order.
    pub fn calls(&self) -> Vec<DerivedFeatureSet> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClassifierClient for MockClassifierClient {
    async fn predict(&self, features: &DerivedFeatureSet) -> Result<ClassificationResult> {
        self.calls.lock().unwrap().push(*features);

        match self.responses.lock().unwrap().pop_front() {
            Some(ScriptedPrediction::Success(result)) => Ok(result),
            Some(ScriptedPrediction::Failure(message)) => Err(Error::PredictionFailed(message)),
            None => Err(Error::PredictionFailed(
                "no scripted response".to_string(),
            )),
        }
    }
}

enum ScriptedCompletion {
    Success(String),
    Quota(String),
    Upstream(String),
}

/// Scripted generation double.
#[derive(Default)]
pub struct MockGenerationClient {
    responses: Mutex<VecDeque<ScriptedCompletion>>,
    instructions: Mutex<Vec<String>>,
}

impl MockGenerationClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_response(&self, markdown: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(ScriptedCompletion::Success(markdown.to_string()));
    }

    pub fn add_quota_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(ScriptedCompletion::Quota(message.to_string()));
    }

    pub fn add_upstream_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(ScriptedCompletion::Upstream(message.to_string()));
    }

    /// The most recent instruction sent to the backend.
    pub fn last_instruction(&self) -> Option<String> {
        self.instructions.lock().unwrap().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.instructions.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    async fn complete(&self, instruction: &str) -> std::result::Result<String, GenerationError> {
        self.instructions
            .lock()
            .unwrap()
            .push(instruction.to_string());

        match self.responses.lock().unwrap().pop_front() {
            Some(ScriptedCompletion::Success(markdown)) => Ok(markdown),
            Some(ScriptedCompletion::Quota(message)) => {
                Err(GenerationError::QuotaExhausted(message))
            }
            Some(ScriptedCompletion::Upstream(message)) => {
                Err(GenerationError::Upstream(message))
            }
            None => Err(GenerationError::Upstream(
                "no scripted response".to_string(),
            )),
        }
    }
}
