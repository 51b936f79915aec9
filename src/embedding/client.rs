use async_trait::async_trait;
use reqwest::{Client, Response};
use tokio::time::timeout;

use super::config::EmbeddingConfig;
use super::errors::EmbeddingError;
use super::models::{EmbeddingRequest, EmbeddingResponse};
use super::retry::RetryPolicy;
use super::EmbeddingProvider;

/// Client for OpenAI-compatible `/embeddings` endpoints.
#[derive(Clone)]
pub struct OpenAiEmbeddingClient {
    config: EmbeddingConfig,
    client: Client,
}

impl OpenAiEmbeddingClient {
    pub fn new(config: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::ConfigurationError {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    async fn embed_once(&self, request: &EmbeddingRequest) -> Result<Vec<f32>, EmbeddingError> {
        let timeout_ms = self.config.timeout.as_millis() as u64;

        let response = timeout(
            self.config.timeout,
            self.client
                .post(&self.config.endpoint)
                .bearer_auth(&self.config.api_key)
                .json(request)
                .send(),
        )
        .await
        .map_err(|_| EmbeddingError::Timeout { timeout_ms })?
        .map_err(|e| from_reqwest_error(e, timeout_ms))?;

        self.handle_response(response).await
    }

    async fn handle_response(&self, response: Response) -> Result<Vec<f32>, EmbeddingError> {
        let status = response.status();
        let timeout_ms = self.config.timeout.as_millis() as u64;

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(EmbeddingError::from_status_and_body(
                status.as_u16(),
                &error_body,
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| from_reqwest_error(e, timeout_ms))?;
        let parsed: EmbeddingResponse =
            serde_json::from_str(&body).map_err(|e| EmbeddingError::ParseError {
                message: format!("Failed to parse response: {e}"),
            })?;

        parsed.into_embedding()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let request = EmbeddingRequest::new(text, self.config.model.clone());

        tracing::debug!(model = %self.config.model, chars = text.len(), "requesting embedding");

        let embedding = RetryPolicy::for_client(&self.config)
            .run(|| self.embed_once(&request))
            .await
            .map_err(|e| e.into_embedding_error(self.config.timeout.as_millis() as u64))?;

        tracing::debug!(dimension = embedding.len(), "received embedding");
        Ok(embedding)
    }
}

fn from_reqwest_error(error: reqwest::Error, timeout_ms: u64) -> EmbeddingError {
    if error.is_timeout() {
        EmbeddingError::Timeout { timeout_ms }
    } else if let Some(status) = error.status() {
        EmbeddingError::from_status_and_body(status.as_u16(), &error.to_string())
    } else {
        EmbeddingError::NetworkError {
            message: error.to_string(),
        }
    }
}
