//! Embedding providers.
//!
//! The store never talks to a provider itself; callers fetch an embedding and hand
//! the resulting vector to [`VectorStore::add`](crate::vector_store::VectorStore::add).

#[cfg(feature = "reqwest")]
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod retry;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::vector_store::VectorStore;

#[cfg(feature = "reqwest")]
pub use client::OpenAiEmbeddingClient;
pub use config::EmbeddingConfig;
pub use errors::{EmbeddingError, RetryError};
pub use models::{EmbeddingRequest, EmbeddingResponse};
pub use retry::RetryPolicy;

/// Turns text into an embedding.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, EmbeddingError>;
}

/// Embed `text` and store it as a text record.
pub async fn embed_and_add_text(
    provider: &dyn EmbeddingProvider,
    store: &mut VectorStore,
    text: &str,
    category: &str,
) -> Result<Uuid> {
    let embedding = provider.embed(text).await?;
    store.add_text(embedding, text, category)
}

/// Embed `query` and return the `n` best text payloads.
pub async fn embed_and_query_texts(
    provider: &dyn EmbeddingProvider,
    store: &VectorStore,
    query: &str,
    n: usize,
    categories: &[String],
) -> Result<Vec<String>> {
    let embedding = provider.embed(query).await?;
    Ok(store.top_n_texts(&embedding, n, categories))
}
