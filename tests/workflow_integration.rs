//! End-to-end assessment workflow tests against scripted external services.

use std::sync::Arc;

use diafit::classifier::{ClassificationResult, PredictedClass};
use diafit::config::ExecutionMode;
use diafit::error::Error;
use diafit::features::RawHealthMetrics;
use diafit::generation::{DocumentKind, GenerationOrchestrator, GenerationRequest};
use diafit::testing::{high_risk_classification, MockClassifierClient, MockGenerationClient};
use diafit::workflow::{self, Assessment, Phase};

fn make_orchestrator(
    generation: Arc<MockGenerationClient>,
    mode: ExecutionMode,
) -> GenerationOrchestrator {
    GenerationOrchestrator::new(generation, mode).expect("orchestrator builds")
}

#[tokio::test]
async fn full_report_traversal_reaches_presented() {
    let classifier = MockClassifierClient::new();
    classifier.add_success(high_risk_classification());

    let generation = Arc::new(MockGenerationClient::new());
    generation.add_response("# Your Risk Report\nHigh risk explained.");
    let orchestrator = make_orchestrator(generation.clone(), ExecutionMode::Production);

    let mut assessment = Assessment::new();
    assessment.submit(RawHealthMetrics::sample());
    assessment.classify(&classifier).await.unwrap();

    let state = assessment.begin_report().unwrap();
    assert_eq!(assessment.phase(), Phase::GeneratingReport);

    let document = assessment
        .present(DocumentKind::Report, &state, &orchestrator)
        .await
        .unwrap();

    assert_eq!(assessment.phase(), Phase::Presented);
    assert_eq!(document.kind, DocumentKind::Report);
    assert_eq!(document.markdown, "# Your Risk Report\nHigh risk explained.");

    // The instruction embedded both the metrics and the verdict.
    let instruction = generation.last_instruction().unwrap();
    assert!(instruction.contains("\"Glucose\": 180.0"));
    assert!(instruction.contains("risk level: High"));
}

#[tokio::test]
async fn full_diet_traversal_skips_classification_dependency() {
    let generation = Arc::new(MockGenerationClient::new());
    generation.add_response("## Week 1");
    let orchestrator = make_orchestrator(generation.clone(), ExecutionMode::Production);

    let mut assessment = Assessment::new();
    assessment.submit(RawHealthMetrics::sample());

    let state = assessment.begin_diet().unwrap();
    let document = assessment
        .present(DocumentKind::Diet, &state, &orchestrator)
        .await
        .unwrap();

    assert_eq!(document.kind, DocumentKind::Diet);
    assert_eq!(assessment.phase(), Phase::Presented);

    let instruction = generation.last_instruction().unwrap();
    assert!(instruction.contains("Hydration Plan"));
}

#[tokio::test]
async fn prediction_failure_blocks_generation_steps() {
    let classifier = MockClassifierClient::new();
    classifier.add_failure("upstream 500");

    let mut assessment = Assessment::new();
    assessment.submit(RawHealthMetrics::sample());

    let err = assessment.classify(&classifier).await.unwrap_err();
    assert!(matches!(err, Error::PredictionFailed(_)));
    assert_eq!(assessment.phase(), Phase::Submitted);

    // Report remains blocked; the user must reclassify first.
    assert!(assessment.begin_report().is_err());

    // A successful retry unblocks it.
    classifier.add_success(high_risk_classification());
    assessment.classify(&classifier).await.unwrap();
    assert!(assessment.begin_report().is_ok());
}

#[tokio::test]
async fn quota_exhaustion_never_surfaces_as_error() {
    let generation = Arc::new(MockGenerationClient::new());
    generation.add_quota_error("Too Many Requests");
    let orchestrator = make_orchestrator(generation, ExecutionMode::Production);

    let mut assessment = Assessment::new();
    assessment.submit(RawHealthMetrics::sample());
    let state = assessment.begin_diet().unwrap();

    let document = assessment
        .present(DocumentKind::Diet, &state, &orchestrator)
        .await
        .unwrap();

    assert_eq!(assessment.phase(), Phase::Presented);
    assert!(document.markdown.contains("daily limit"));
}

#[tokio::test]
async fn production_generation_failure_keeps_assessment_unpresented() {
    let generation = Arc::new(MockGenerationClient::new());
    generation.add_upstream_error("boom");
    let orchestrator = make_orchestrator(generation, ExecutionMode::Production);

    let mut assessment = Assessment::new();
    assessment.submit(RawHealthMetrics::sample());
    let state = assessment.begin_diet().unwrap();

    let err = assessment
        .present(DocumentKind::Diet, &state, &orchestrator)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::GenerationFailed(_)));
    assert_eq!(assessment.phase(), Phase::GeneratingDiet);
    assert!(assessment.last_error().is_some());
}

#[tokio::test]
async fn report_from_foreign_transport_state_uses_default_verdict() {
    // A transport map produced elsewhere may lack the verdict entirely; the
    // decode side supplies the documented default instead of failing.
    let generation = Arc::new(MockGenerationClient::new());
    generation.add_response("report text");
    let orchestrator = make_orchestrator(generation.clone(), ExecutionMode::Production);

    let mut assessment = Assessment::new();
    assessment.submit(RawHealthMetrics::sample());
    let state = assessment.begin_diet().unwrap();

    let request = workflow::request_from_transport(DocumentKind::Report, &state).unwrap();
    match &request {
        GenerationRequest::Report { classification, .. } => {
            assert_eq!(
                *classification,
                ClassificationResult {
                    predicted_class: PredictedClass::NoDiabetes,
                    probability: 0.0,
                    risk_level: "Unknown".to_string(),
                }
            );
        }
        GenerationRequest::Diet { .. } => panic!("expected a report request"),
    }

    orchestrator.generate(&request).await.unwrap();
    let instruction = generation.last_instruction().unwrap();
    assert!(instruction.contains("risk level: Unknown"));
}
