//! OpenAI embedding provider.
//!
//! Uses the hosted `/v1/embeddings` API. Requires an API key; constructing
//! the provider without one fails with a configuration error before any
//! network call is attempted.

use crate::config::{resolve_api_key, resolve_embedding_endpoint, resolve_embedding_model, Config};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

use super::provider::EmbeddingProvider;
use super::types::{openai_models, ProviderInfo};

/// OpenAI embedding provider.
pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    dimensions: usize,
    max_chars: usize,
}

impl OpenAiProvider {
    /// Create a provider from resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when no API key is configured.
    pub fn new() -> Result<Self> {
        Self::with_config(None, None, None)
    }

    /// Create a provider from an explicit [`Config`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when the config carries no API key.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_config(
            Some(config.embedding_endpoint.clone()),
            Some(config.embedding_model.clone()),
            config.api_key.clone(),
        )
    }

    /// Create a provider with custom configuration.
    ///
    /// `None` fields fall back to the resolver chain (env > config file
    /// > default).
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` when no API key is available anywhere.
    pub fn with_config(
        endpoint: Option<String>,
        model: Option<String>,
        api_key: Option<String>,
    ) -> Result<Self> {
        let api_key = api_key
            .or_else(resolve_api_key)
            .ok_or_else(|| Error::Config("OPENAI_API_KEY not set".into()))?;
        let endpoint = endpoint.unwrap_or_else(resolve_embedding_endpoint);
        let model = model.unwrap_or_else(resolve_embedding_model);
        let config = openai_models::get_config(&model);

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            model,
            api_key,
            dimensions: config.dimensions,
            max_chars: config.max_chars,
        })
    }
}

/// OpenAI API request for embeddings.
#[derive(Debug, Serialize)]
struct OpenAiEmbedRequest<'a> {
    model: &'a str,
    input: EmbedInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum EmbedInput<'a> {
    Single(&'a str),
    Batch(Vec<&'a str>),
}

/// OpenAI API response for embeddings.
#[derive(Debug, Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbedding {
    embedding: Vec<f32>,
}

impl EmbeddingProvider for OpenAiProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "openai".to_string(),
            model: self.model.clone(),
            dimensions: self.dimensions,
            max_chars: self.max_chars,
            available: false, // Checked by is_available()
        }
    }

    async fn is_available(&self) -> bool {
        // Available if we hold a key. Pinging the API would spend quota.
        !self.api_key.is_empty()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/v1/embeddings", self.endpoint);

        let request = OpenAiEmbedRequest {
            model: &self.model,
            input: EmbedInput::Single(text),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("OpenAI request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            return Err(Error::Provider(format!(
                "OpenAI API error ({status}): {error}"
            )));
        }

        let data: OpenAiEmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("Failed to parse OpenAI response: {e}")))?;

        data.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| Error::Provider("No embeddings returned from OpenAI".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/v1/embeddings", self.endpoint);

        let request = OpenAiEmbedRequest {
            model: &self.model,
            input: EmbedInput::Batch(texts.to_vec()),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("OpenAI batch request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error = response.text().await.unwrap_or_default();
            return Err(Error::Provider(format!(
                "OpenAI API error ({status}): {error}"
            )));
        }

        let data: OpenAiEmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("Failed to parse OpenAI response: {e}")))?;

        Ok(data.data.into_iter().map(|d| d.embedding).collect())
    }
}
