//! Embedding provider trait.
//!
//! Defines the interface the retrieval engine consumes. Methods are
//! async because the real provider is an HTTP service; test doubles
//! implement the same trait with canned vectors.

use crate::error::Result;
use super::types::ProviderInfo;

/// Trait for embedding providers.
///
/// Implemented by the OpenAI adapter and by deterministic mocks in tests.
pub trait EmbeddingProvider: Send + Sync {
    /// Get provider metadata.
    fn info(&self) -> ProviderInfo;

    /// Check if the provider is usable (credential present, reachable).
    fn is_available(&self) -> impl std::future::Future<Output = bool> + Send;

    /// Generate an embedding for a single text.
    fn embed(&self, text: &str) -> impl std::future::Future<Output = Result<Vec<f32>>> + Send;

    /// Generate embeddings for multiple texts.
    ///
    /// Default implementation calls [`EmbeddingProvider::embed`] per text.
    fn embed_batch(
        &self,
        texts: &[&str],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>>> + Send {
        async move {
            let mut results = Vec::with_capacity(texts.len());
            for text in texts {
                results.push(self.embed(text).await?);
            }
            Ok(results)
        }
    }
}

/// Boxed provider for dynamic dispatch.
///
/// The trait has async methods with `impl Future`, so runtime
/// polymorphism needs this wrapper.
pub struct BoxedProvider {
    inner: Box<dyn EmbeddingProviderBoxed + Send + Sync>,
}

/// Object-safe version of [`EmbeddingProvider`] for boxing.
trait EmbeddingProviderBoxed: Send + Sync {
    fn info(&self) -> ProviderInfo;
    fn is_available_boxed(
        &self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = bool> + Send + '_>>;
    fn embed_boxed(
        &self,
        text: &str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>>> + Send + '_>>;
    fn embed_batch_boxed(
        &self,
        texts: &[&str],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<Vec<f32>>>> + Send + '_>>;
}

impl BoxedProvider {
    /// Box a concrete provider.
    pub fn new<P: EmbeddingProvider + 'static>(provider: P) -> Self {
        Self {
            inner: Box::new(BoxedProviderWrapper(provider)),
        }
    }

    /// Get provider metadata.
    #[must_use]
    pub fn info(&self) -> ProviderInfo {
        self.inner.info()
    }

    /// Check if the provider is usable.
    pub async fn is_available(&self) -> bool {
        self.inner.is_available_boxed().await
    }

    /// Generate an embedding for a single text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.inner.embed_boxed(text).await
    }

    /// Generate embeddings for multiple texts.
    pub async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.inner.embed_batch_boxed(texts).await
    }
}

/// Wrapper implementing the object-safe trait for any provider.
struct BoxedProviderWrapper<P: EmbeddingProvider + 'static>(P);

impl<P: EmbeddingProvider + 'static> EmbeddingProviderBoxed for BoxedProviderWrapper<P> {
    fn info(&self) -> ProviderInfo {
        self.0.info()
    }

    fn is_available_boxed(
        &self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = bool> + Send + '_>> {
        Box::pin(self.0.is_available())
    }

    fn embed_boxed(
        &self,
        text: &str,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<f32>>> + Send + '_>> {
        // Owned copy so the future does not borrow the caller's &str.
        let text = text.to_string();
        Box::pin(async move { self.0.embed(&text).await })
    }

    fn embed_batch_boxed(
        &self,
        texts: &[&str],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Vec<Vec<f32>>>> + Send + '_>>
    {
        let texts: Vec<String> = texts.iter().map(|s| (*s).to_string()).collect();
        Box::pin(async move {
            let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
            self.0.embed_batch(&refs).await
        })
    }
}
