//! Wire models for OpenAI-compatible `/embeddings` endpoints.

use serde::{Deserialize, Serialize};

use super::errors::EmbeddingError;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbeddingRequest {
    pub input: String,
    pub model: String,
}

impl EmbeddingRequest {
    pub fn new(input: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            model: model.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub data: Vec<EmbeddingData>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingData {
    #[serde(default)]
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub index: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl EmbeddingResponse {
    /// The first embedding; a missing or empty vector is an invalid response.
    pub fn into_embedding(self) -> Result<Vec<f32>, EmbeddingError> {
        let first = self
            .data
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse {
                message: "response contains no data".to_string(),
            })?;

        if first.embedding.is_empty() {
            return Err(EmbeddingError::InvalidResponse {
                message: "response embedding is empty".to_string(),
            });
        }

        Ok(first.embedding)
    }
}
