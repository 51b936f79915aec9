use thiserror::Error;

use crate::error::VectorSearchError;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },
}

impl EmbeddingError {
    pub fn is_retryable(&self) -> bool {
        match self {
            EmbeddingError::RateLimitExceeded { .. } => true,
            EmbeddingError::Timeout { .. } => true,
            EmbeddingError::NetworkError { .. } => true,
            EmbeddingError::ServerError { status, .. } => *status >= 500,
            EmbeddingError::ServiceUnavailable { .. } => true,
            _ => false,
        }
    }

    pub fn is_authentication_error(&self) -> bool {
        matches!(self, EmbeddingError::AuthenticationFailed { .. })
    }

    /// Server-suggested wait before the next attempt.
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            EmbeddingError::RateLimitExceeded { .. } => Some(20),
            EmbeddingError::ServiceUnavailable { .. } => Some(30),
            _ => None,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            EmbeddingError::AuthenticationFailed { .. } => {
                "Embedding API authentication failed. Please check your API key.".to_string()
            }
            EmbeddingError::RateLimitExceeded { .. } => {
                "Embedding API rate limit exceeded. Please wait a moment and try again."
                    .to_string()
            }
            EmbeddingError::Timeout { .. } => "Embedding request timed out.".to_string(),
            EmbeddingError::NetworkError { .. } => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            EmbeddingError::ServerError { .. } | EmbeddingError::ServiceUnavailable { .. } => {
                "The embedding service is experiencing issues. Please try again later."
                    .to_string()
            }
            EmbeddingError::InvalidRequest { message } => format!("Invalid request: {message}"),
            EmbeddingError::ParseError { .. } | EmbeddingError::InvalidResponse { .. } => {
                "Received an invalid response from the embedding service.".to_string()
            }
            EmbeddingError::ConfigurationError { message } => {
                format!("Configuration error: {message}")
            }
        }
    }

    /// Map a non-success HTTP status and its body.
    pub fn from_status_and_body(status: u16, body: &str) -> Self {
        // OpenAI-compatible servers report {"error": {"message": ...}}
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.to_string());

        match status {
            400 | 404 | 422 => EmbeddingError::InvalidRequest { message },
            401 | 403 => EmbeddingError::AuthenticationFailed { message },
            429 => EmbeddingError::RateLimitExceeded { message },
            503 => EmbeddingError::ServiceUnavailable { message },
            500..=599 => EmbeddingError::ServerError { status, message },
            _ => EmbeddingError::InvalidRequest {
                message: format!("HTTP {status}: {message}"),
            },
        }
    }
}

impl From<EmbeddingError> for VectorSearchError {
    fn from(error: EmbeddingError) -> Self {
        VectorSearchError::embedding(error.to_string())
    }
}

#[derive(Debug, Error)]
pub enum RetryError {
    #[error("Maximum retry attempts exceeded: {last}")]
    MaxAttemptsExceeded { last: EmbeddingError },

    #[error("Retry timeout exceeded")]
    TimeoutExceeded,

    #[error("Non-retryable error: {source}")]
    NonRetryable { source: EmbeddingError },
}

impl RetryError {
    /// The underlying provider error, if any.
    pub fn into_embedding_error(self, timeout_ms: u64) -> EmbeddingError {
        match self {
            RetryError::MaxAttemptsExceeded { last } => last,
            RetryError::NonRetryable { source } => source,
            RetryError::TimeoutExceeded => EmbeddingError::Timeout { timeout_ms },
        }
    }
}
