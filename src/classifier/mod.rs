//! Client for the external risk classifier service.
//!
//! The classifier is an opaque HTTP collaborator: it takes the full 18-field
//! feature set as JSON and answers with a class, a probability and a risk
//! label. This layer passes those fields through unchanged and never retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::features::DerivedFeatureSet;

/// Binary verdict returned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PredictedClass {
    #[serde(rename = "Diabetes")]
    Diabetes,
    #[default]
    #[serde(rename = "No Diabetes")]
    NoDiabetes,
}

impl PredictedClass {
    /// Label used by the model service and in generated documents.
    pub fn label(&self) -> &'static str {
        match self {
            PredictedClass::Diabetes => "Diabetes",
            PredictedClass::NoDiabetes => "No Diabetes",
        }
    }
}

/// Normalized classifier verdict.
///
/// Owned by the workflow for one traversal, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub predicted_class: PredictedClass,
    /// Probability of the predicted class, percent in [0, 100]
    pub probability: f64,
    pub risk_level: String,
}

impl Default for ClassificationResult {
    /// Stand-in used when a report is generated without a stored verdict.
    fn default() -> Self {
        Self {
            predicted_class: PredictedClass::NoDiabetes,
            probability: 0.0,
            risk_level: "Unknown".to_string(),
        }
    }
}

/// Risk classification backend.
///
/// Injected into the workflow and the API server so tests can substitute a
/// scripted double.
#[async_trait]
pub trait ClassifierClient: Send + Sync {
    /// One-shot classification of a derived feature set.
    ///
    /// Fail-fast: transport errors, non-2xx statuses and malformed bodies all
    /// come back as [`Error::PredictionFailed`]. Retrying is the caller's
    /// decision.
    async fn predict(&self, features: &DerivedFeatureSet) -> Result<ClassificationResult>;
}

/// HTTP implementation against the model service.
pub struct HttpClassifierClient {
    client: Client,
    endpoint: String,
}

impl HttpClassifierClient {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ClassifierClient for HttpClassifierClient {
    async fn predict(&self, features: &DerivedFeatureSet) -> Result<ClassificationResult> {
        debug!("Sending feature set to classifier at {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(features)
            .send()
            .await
            .map_err(|e| Error::PredictionFailed(format!("classifier request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::PredictionFailed(format!(
                "classifier returned {status}: {body}"
            )));
        }

        response
            .json::<ClassificationResult>()
            .await
            .map_err(|e| Error::PredictionFailed(format!("malformed classifier response: {e}")))
    }
}
