//! Configuration for the embedding client.

use std::time::Duration;

use super::errors::EmbeddingError;
use crate::config::{self, Config};
use crate::env::apis as env_vars;

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Full URL of the `/embeddings` endpoint.
    pub endpoint: String,

    pub model: String,

    pub api_key: String,

    /// Per-request timeout, also the total retry budget.
    pub timeout: Duration,

    pub max_retries: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: config::DEFAULT_EMBEDDING_ENDPOINT.to_string(),
            model: config::DEFAULT_EMBEDDING_MODEL.to_string(),
            api_key: std::env::var(env_vars::OPENAI_API_KEY).unwrap_or_default(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

impl EmbeddingConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Build from the config file, with environment variables taking priority.
    pub fn from_config(config: &Config) -> Self {
        let endpoint = std::env::var(env_vars::EMBEDDING_ENDPOINT)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| config.embedding.endpoint.clone());
        let model = std::env::var(env_vars::EMBEDDING_MODEL)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| config.embedding.model.clone());

        Self {
            endpoint,
            model,
            api_key: config::get_api_key(config).unwrap_or_default(),
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.api_key.is_empty() {
            return Err(EmbeddingError::ConfigurationError {
                message: format!(
                    "Embedding API key is required (set {} or `config set api-key`)",
                    env_vars::OPENAI_API_KEY
                ),
            });
        }

        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(EmbeddingError::ConfigurationError {
                message: format!("Endpoint must be an http(s) URL: {}", self.endpoint),
            });
        }

        if self.model.is_empty() {
            return Err(EmbeddingError::ConfigurationError {
                message: "Model name cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}
