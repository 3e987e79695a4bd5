//! Assessment workflow state machine.
//!
//! One [`Assessment`] owns the derived feature set and the classifier verdict
//! for a single traversal: Idle → Submitted → Classified → Generating →
//! Presented. Steps hand state to each other only through the transport
//! codec; nothing is shared across requests or users.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::classifier::{ClassificationResult, ClassifierClient};
use crate::error::{Error, Result};
use crate::features::{self, DerivedFeatureSet, RawHealthMetrics};
use crate::generation::{
    DocumentKind, GeneratedDocument, GenerationOrchestrator, GenerationRequest,
};
use crate::transport;

/// Where an assessment currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitted,
    Classified,
    GeneratingDiet,
    GeneratingReport,
    Presented,
}

/// A single user's pass through the assessment workflow.
#[derive(Debug)]
pub struct Assessment {
    phase: Phase,
    features: Option<DerivedFeatureSet>,
    classification: Option<ClassificationResult>,
    last_error: Option<String>,
    started_at: DateTime<Utc>,
}

impl Default for Assessment {
    fn default() -> Self {
        Self::new()
    }
}

impl Assessment {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            features: None,
            classification: None,
            last_error: None,
            started_at: Utc::now(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn classification(&self) -> Option<&ClassificationResult> {
        self.classification.as_ref()
    }

    /// Error annotation from the last failed step, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Idle → Submitted: accept raw metrics and derive features synchronously.
    ///
    /// Resubmitting discards any prior verdict.
    pub fn submit(&mut self, raw: RawHealthMetrics) -> DerivedFeatureSet {
        let derived = features::derive(raw);
        self.features = Some(derived);
        self.classification = None;
        self.last_error = None;
        self.phase = Phase::Submitted;
        derived
    }

    /// Submitted → Classified via the injected classifier.
    ///
    /// On failure the assessment drops back to Submitted with the error
    /// recorded and no partial verdict retained.
    pub async fn classify(
        &mut self,
        client: &dyn ClassifierClient,
    ) -> Result<ClassificationResult> {
        let features = self.features.ok_or_else(|| {
            Error::Workflow("no submitted metrics to classify".to_string())
        })?;

        match client.predict(&features).await {
            Ok(result) => {
                info!(
                    "Classified as {} ({}%, risk {})",
                    result.predicted_class.label(),
                    result.probability,
                    result.risk_level
                );
                self.classification = Some(result.clone());
                self.last_error = None;
                self.phase = Phase::Classified;
                Ok(result)
            }
            Err(e) => {
                warn!("Classification failed: {e}");
                self.classification = None;
                self.last_error = Some(e.to_string());
                self.phase = Phase::Submitted;
                Err(e)
            }
        }
    }

    /// Encode transport state for the diet page. Diet generation does not
    /// depend on a verdict, so this is allowed straight after submission.
    pub fn begin_diet(&mut self) -> Result<BTreeMap<String, String>> {
        let features = self
            .features
            .ok_or_else(|| Error::Workflow("no submitted metrics".to_string()))?;
        let map = transport::encode(&features, None)?;
        self.phase = Phase::GeneratingDiet;
        Ok(map)
    }

    /// Encode transport state for the report page.
    ///
    /// Blocked until a classification exists; a report without a verdict has
    /// nothing to explain.
    pub fn begin_report(&mut self) -> Result<BTreeMap<String, String>> {
        let features = self
            .features
            .ok_or_else(|| Error::Workflow("no submitted metrics".to_string()))?;
        let classification = self.classification.as_ref().ok_or_else(|| {
            Error::Workflow("report generation requires a completed classification".to_string())
        })?;
        let map = transport::encode(&features, Some(classification))?;
        self.phase = Phase::GeneratingReport;
        Ok(map)
    }

    /// Generating → Presented: decode the transport map and run generation.
    ///
    /// Terminal per visit; a new traversal starts with a fresh [`Assessment`].
    pub async fn present(
        &mut self,
        kind: DocumentKind,
        map: &BTreeMap<String, String>,
        orchestrator: &GenerationOrchestrator,
    ) -> Result<GeneratedDocument> {
        let request = request_from_transport(kind, map)?;
        match orchestrator.generate(&request).await {
            Ok(document) => {
                self.phase = Phase::Presented;
                Ok(document)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

/// Rebuild a generation request from a decoded transport map.
///
/// A report map with a missing or unreadable verdict falls back to
/// [`ClassificationResult::default`] rather than failing the step; the server
/// side of the workflow is deliberately tolerant here, while [`Assessment`]
/// blocks the transition before it is ever encoded.
pub fn request_from_transport(
    kind: DocumentKind,
    map: &BTreeMap<String, String>,
) -> Result<GenerationRequest> {
    let (features, classification) = transport::decode(map)?;

    Ok(match kind {
        DocumentKind::Diet => GenerationRequest::Diet { features },
        DocumentKind::Report => GenerationRequest::Report {
            features,
            classification: classification.unwrap_or_default(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{high_risk_classification, MockClassifierClient};

    #[tokio::test]
    async fn test_happy_path_to_classified() {
        let client = MockClassifierClient::new();
        client.add_success(high_risk_classification());

        let mut assessment = Assessment::new();
        assert_eq!(assessment.phase(), Phase::Idle);

        let derived = assessment.submit(RawHealthMetrics::sample());
        assert_eq!(assessment.phase(), Phase::Submitted);
        assert_eq!(derived.is_obese, 1);

        let result = assessment.classify(&client).await.unwrap();
        assert_eq!(assessment.phase(), Phase::Classified);
        assert_eq!(result.risk_level, "High");
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_classification_failure_returns_to_submitted() {
        let client = MockClassifierClient::new();
        client.add_failure("connection refused");

        let mut assessment = Assessment::new();
        assessment.submit(RawHealthMetrics::sample());

        let result = assessment.classify(&client).await;
        assert!(result.is_err());
        assert_eq!(assessment.phase(), Phase::Submitted);
        assert!(assessment.classification().is_none());
        assert!(assessment.last_error().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_report_is_blocked_without_classification() {
        let mut assessment = Assessment::new();
        assessment.submit(RawHealthMetrics::sample());

        let result = assessment.begin_report();
        assert!(matches!(result, Err(Error::Workflow(_))));
        assert_eq!(assessment.phase(), Phase::Submitted);
    }

    #[tokio::test]
    async fn test_diet_is_allowed_without_classification() {
        let mut assessment = Assessment::new();
        assessment.submit(RawHealthMetrics::sample());

        let map = assessment.begin_diet().unwrap();
        assert_eq!(assessment.phase(), Phase::GeneratingDiet);
        assert!(!map.contains_key("assessment"));
    }

    #[tokio::test]
    async fn test_classify_before_submit_is_an_error() {
        let client = MockClassifierClient::new();
        let mut assessment = Assessment::new();

        let result = assessment.classify(&client).await;
        assert!(matches!(result, Err(Error::Workflow(_))));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn test_report_request_defaults_missing_verdict() {
        let features = features::derive(RawHealthMetrics::sample());
        let map = transport::encode(&features, None).unwrap();

        let request = request_from_transport(DocumentKind::Report, &map).unwrap();
        match request {
            GenerationRequest::Report { classification, .. } => {
                assert_eq!(classification.risk_level, "Unknown");
            }
            GenerationRequest::Diet { .. } => panic!("expected a report request"),
        }
    }
}
