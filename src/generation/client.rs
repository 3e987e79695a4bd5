//! HTTP client for the text-generation backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Generation backend failure, before the orchestrator's fallback policy is
/// applied. Quota exhaustion gets its own variant because it is handled as a
/// successful outcome upstream.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("{0}")]
    Upstream(String),
}

/// Opaque text-completion backend.
///
/// One instruction in, generated markdown out. No retries at this layer.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn complete(&self, instruction: &str) -> std::result::Result<String, GenerationError>;
}

/// Client for a Gemini-style `generateContent` REST endpoint.
pub struct HttpGenerationClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpGenerationClient {
    pub fn new(endpoint: String, api_key: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn complete(&self, instruction: &str) -> std::result::Result<String, GenerationError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: instruction.to_string(),
                }],
            }],
        };

        debug!(
            "Sending {} chars of instruction to generation service",
            instruction.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Upstream(format!("generation request failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::QuotaExhausted(format!(
                "generation service returned 429: {body}"
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Some gateways report quota exhaustion with a non-429 status.
            if body.to_lowercase().contains("too many requests") {
                return Err(GenerationError::QuotaExhausted(body));
            }
            return Err(GenerationError::Upstream(format!(
                "generation service returned {status}: {body}"
            )));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            GenerationError::Upstream(format!("malformed generation response: {e}"))
        })?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| {
                GenerationError::Upstream("generation response carried no candidates".to_string())
            })
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
