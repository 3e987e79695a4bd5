//! Layered service configuration.
//!
//! Precedence, lowest to highest: hardcoded defaults, an optional YAML file,
//! `DIAFIT_*` environment variables. Secrets (the generation API key) are
//! accepted from file or environment only, never from CLI flags.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Execution mode, gating the generation fallback tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Production,
    Development,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Full URL of the classifier's predict endpoint.
    #[serde(default = "default_classifier_endpoint")]
    pub classifier_endpoint: String,

    /// Base URL of the generation service API.
    #[serde(default = "default_generation_endpoint")]
    pub generation_endpoint: String,

    /// Generation model name.
    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    /// API key for the generation service.
    #[serde(default)]
    pub generation_api_key: Option<String>,

    /// Upper bound on classifier and generation calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Port the API server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub mode: ExecutionMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            classifier_endpoint: default_classifier_endpoint(),
            generation_endpoint: default_generation_endpoint(),
            generation_model: default_generation_model(),
            generation_api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
            port: default_port(),
            mode: ExecutionMode::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the file if given, then environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                serde_yaml::from_str(&content)?
            }
            None => Self::default(),
        };

        config.apply_env();

        if config.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be positive".to_string(),
            ));
        }

        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("DIAFIT_CLASSIFIER_ENDPOINT") {
            self.classifier_endpoint = v;
        }
        if let Ok(v) = std::env::var("DIAFIT_GENERATION_ENDPOINT") {
            self.generation_endpoint = v;
        }
        if let Ok(v) = std::env::var("DIAFIT_GENERATION_MODEL") {
            self.generation_model = v;
        }
        if let Ok(v) = std::env::var("DIAFIT_GENERATION_API_KEY") {
            self.generation_api_key = Some(v);
        }
        if let Ok(v) = std::env::var("DIAFIT_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse() {
                self.request_timeout_secs = secs;
            }
        }
        if let Ok(v) = std::env::var("DIAFIT_PORT") {
            if let Ok(port) = v.parse() {
                self.port = port;
            }
        }
        if let Ok(v) = std::env::var("DIAFIT_MODE") {
            match v.to_lowercase().as_str() {
                "development" | "dev" => self.mode = ExecutionMode::Development,
                "production" | "prod" => self.mode = ExecutionMode::Production,
                _ => {}
            }
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Full `generateContent` URL for the configured model.
    pub fn generation_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.generation_endpoint.trim_end_matches('/'),
            self.generation_model
        )
    }
}

fn default_classifier_endpoint() -> String {
    "http://127.0.0.1:8000/predict".to_string()
}

fn default_generation_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_generation_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_port() -> u16 {
    3000
}
