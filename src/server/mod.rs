//! JSON API surface for the assessment workflow.
//!
//! Every route is a single request/response cycle. State between steps rides
//! in the transport map returned by `/api/assess` and posted back to the
//! generation routes; the server itself keeps nothing per user.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::classifier::{ClassificationResult, ClassifierClient};
use crate::features::{self, catalog, RawHealthMetrics};
use crate::generation::{DocumentKind, GeneratedDocument, GenerationOrchestrator};
use crate::transport;
use crate::workflow;

/// Shared handler state: the injected external clients.
pub struct AppState {
    pub classifier: Arc<dyn ClassifierClient>,
    pub orchestrator: GenerationOrchestrator,
}

/// API server for the assessment workflow.
pub struct ApiServer {
    state: Arc<AppState>,
    port: u16,
}

impl ApiServer {
    pub fn new(
        classifier: Arc<dyn ClassifierClient>,
        orchestrator: GenerationOrchestrator,
        port: u16,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                classifier,
                orchestrator,
            }),
            port,
        }
    }

    /// Bind and serve until shutdown.
    pub async fn start(self) -> anyhow::Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let app = self.build_router();

        info!("Starting assessment API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    fn build_router(self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/api/fields", get(list_fields))
            .route("/api/assess", post(assess))
            .route("/api/diet-plan", post(generate_diet))
            .route("/api/report", post(generate_report))
            .layer(CorsLayer::permissive())
            .with_state(self.state)
    }
}

/// API response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Debug, Serialize)]
struct AssessResponse {
    classification: ClassificationResult,
    /// Transport state for the follow-up generation routes.
    state: BTreeMap<String, String>,
}

// API Handlers

async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("Assessment API is healthy"))
}

async fn list_fields() -> Json<ApiResponse<&'static [catalog::FieldGroup]>> {
    Json(ApiResponse::success(catalog::FIELD_GROUPS))
}

async fn assess(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<RawHealthMetrics>,
) -> (StatusCode, Json<ApiResponse<AssessResponse>>) {
    let derived = features::derive(raw);

    let classification = match state.classifier.predict(&derived).await {
        Ok(classification) => classification,
        Err(e) => {
            warn!("Classification failed: {}", e);
            return (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::error(e.to_string())),
            );
        }
    };

    match transport::encode(&derived, Some(&classification)) {
        Ok(map) => (
            StatusCode::OK,
            Json(ApiResponse::success(AssessResponse {
                classification,
                state: map,
            })),
        ),
        Err(e) => {
            warn!("Failed to encode transport state: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(e.to_string())),
            )
        }
    }
}

async fn generate_diet(
    State(state): State<Arc<AppState>>,
    Json(map): Json<BTreeMap<String, String>>,
) -> (StatusCode, Json<ApiResponse<GeneratedDocument>>) {
    generate_document(state, DocumentKind::Diet, map).await
}

async fn generate_report(
    State(state): State<Arc<AppState>>,
    Json(map): Json<BTreeMap<String, String>>,
) -> (StatusCode, Json<ApiResponse<GeneratedDocument>>) {
    generate_document(state, DocumentKind::Report, map).await
}

/// One implementation for both generation routes, selected by kind.
async fn generate_document(
    state: Arc<AppState>,
    kind: DocumentKind,
    map: BTreeMap<String, String>,
) -> (StatusCode, Json<ApiResponse<GeneratedDocument>>) {
    let request = match workflow::request_from_transport(kind, &map) {
        Ok(request) => request,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(e.to_string())),
            )
        }
    };

    match state.orchestrator.generate(&request).await {
        Ok(document) => (StatusCode::OK, Json(ApiResponse::success(document))),
        Err(e) => {
            warn!("Generation failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ApiResponse::error(e.to_string())),
            )
        }
    }
}
