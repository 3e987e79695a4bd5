//! Orchestration of the text-generation backend.
//!
//! One orchestrator serves both document kinds, parameterized by the request
//! variant and the prompt registry. Quota exhaustion and non-production
//! failures come back as successful documents carrying placeholder text; only
//! a production failure surfaces as [`Error::GenerationFailed`]. The calling
//! surface has no graceful way to present a partial failure, so those two
//! conditions are modeled as outcomes, not errors.

pub mod client;
mod prompt;

pub use client::{GenerationClient, GenerationError, HttpGenerationClient};
pub use prompt::PromptRegistry;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classifier::ClassificationResult;
use crate::config::ExecutionMode;
use crate::error::{Error, Result};
use crate::features::DerivedFeatureSet;

/// Kind of document the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Diet,
    Report,
}

/// A single generation call. Built immediately before the call, discarded
/// after the response is obtained.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    Diet {
        features: DerivedFeatureSet,
    },
    Report {
        features: DerivedFeatureSet,
        classification: ClassificationResult,
    },
}

impl GenerationRequest {
    pub fn kind(&self) -> DocumentKind {
        match self {
            GenerationRequest::Diet { .. } => DocumentKind::Diet,
            GenerationRequest::Report { .. } => DocumentKind::Report,
        }
    }
}

/// Generated markdown plus the kind it answers. Ephemeral; regenerated on
/// every visit, never cached.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocument {
    pub kind: DocumentKind,
    pub markdown: String,
}

pub struct GenerationOrchestrator {
    client: Arc<dyn GenerationClient>,
    prompts: PromptRegistry,
    mode: ExecutionMode,
}

impl GenerationOrchestrator {
    pub fn new(client: Arc<dyn GenerationClient>, mode: ExecutionMode) -> Result<Self> {
        Ok(Self {
            client,
            prompts: PromptRegistry::new()?,
            mode,
        })
    }

    /// Run one generation call and apply the fallback policy.
    ///
    /// Tiers, in order: quota exhaustion yields a placeholder document as a
    /// success; any other failure outside production yields a short fallback
    /// plan, also as a success; in production the failure surfaces as
    /// [`Error::GenerationFailed`]. No retries.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedDocument> {
        let kind = request.kind();
        let instruction = self.prompts.render(request)?;
        info!("Requesting {kind:?} generation");

        match self.client.complete(&instruction).await {
            Ok(markdown) => Ok(GeneratedDocument { kind, markdown }),
            Err(GenerationError::QuotaExhausted(msg)) => {
                warn!("Generation quota exhausted, serving placeholder: {msg}");
                Ok(GeneratedDocument {
                    kind,
                    markdown: quota_placeholder(kind).to_string(),
                })
            }
            Err(GenerationError::Upstream(msg)) if self.mode != ExecutionMode::Production => {
                warn!(
                    "Generation failed in {:?} mode, serving fallback plan: {msg}",
                    self.mode
                );
                Ok(GeneratedDocument {
                    kind,
                    markdown: fallback_placeholder(kind).to_string(),
                })
            }
            Err(GenerationError::Upstream(msg)) => Err(Error::GenerationFailed(msg)),
        }
    }
}

fn quota_placeholder(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Diet => {
            "You have exceeded the daily limit for generating diet plans. \
             Please try again tomorrow or upgrade your plan."
        }
        DocumentKind::Report => {
            "Your daily limit for generating reports has been exceeded. \
             Please try again tomorrow or consider upgrading your usage limits."
        }
    }
}

fn fallback_placeholder(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::Diet => {
            "Fallback diet plan:\n\n\
             - Eat more greens\n\
             - Reduce sugar\n\
             - Stay hydrated\n\
             - Daily walk\n\
             - Avoid processed foods"
        }
        DocumentKind::Report => {
            "Fallback report:\n\n\
             - Risk level: Moderate\n\
             - Exercise regularly\n\
             - Eat low-GI foods\n\
             - Stay positive and mindful\n\n\
             This is a placeholder due to API limits."
        }
    }
}
