//! Embedding generation for semantic search.
//!
//! One concrete HTTP provider (OpenAI `/v1/embeddings`) behind the
//! [`EmbeddingProvider`] trait, plus the degrade policy the retrieval
//! pipeline relies on: a provider failure never propagates past
//! [`embed_or_zero`]. The caller gets a zero vector of the expected
//! dimensionality instead, and every such substitution is logged.
//!
//! A zero vector has zero cosine similarity to everything, so the
//! affected query (or indexed entry) ranks below any realistic
//! threshold rather than crashing the request.
//!
//! # Configuration
//!
//! Environment variables take precedence over `~/.gday/config.json`:
//! - `OPENAI_API_KEY` - API credential (required to construct the provider)
//! - `OPENAI_ENDPOINT` - Base URL (default: `https://api.openai.com`)
//! - `EMBEDDING_MODEL` - Model (default: `text-embedding-3-small`)

pub mod openai;
pub mod provider;
pub mod types;

// Re-exports for convenience
pub use openai::OpenAiProvider;
pub use provider::{BoxedProvider, EmbeddingProvider};
pub use types::{openai_models, ModelConfig, ProviderInfo};

/// Embed `text`, substituting a zero vector on provider failure.
///
/// This is the caller-visible contract of the embedding client: a
/// provider outage degrades ranking for the affected call instead of
/// failing it. The substitution is logged so the degrade is visible in
/// operation.
pub async fn embed_or_zero(provider: &BoxedProvider, text: &str) -> Vec<f32> {
    match provider.embed(text).await {
        Ok(embedding) => embedding,
        Err(e) => {
            let dimensions = provider.info().dimensions;
            tracing::warn!(
                "embedding failed, substituting {dimensions}-dim zero vector: {e}"
            );
            vec![0.0; dimensions]
        }
    }
}
