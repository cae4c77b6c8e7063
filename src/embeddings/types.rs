//! Embedding types and model configuration.

use serde::{Deserialize, Serialize};

/// Provider metadata returned from availability check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
    pub dimensions: usize,
    pub max_chars: usize,
    pub available: bool,
}

/// Model configuration with dimensions and max input size.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub name: String,
    pub dimensions: usize,
    pub max_chars: usize,
}

/// OpenAI embedding model configurations.
pub mod openai_models {
    use super::ModelConfig;

    pub fn text_embedding_3_small() -> ModelConfig {
        ModelConfig {
            name: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            max_chars: 24000,
        }
    }

    pub fn text_embedding_3_large() -> ModelConfig {
        ModelConfig {
            name: "text-embedding-3-large".to_string(),
            dimensions: 3072,
            max_chars: 24000,
        }
    }

    pub fn text_embedding_ada_002() -> ModelConfig {
        ModelConfig {
            name: "text-embedding-ada-002".to_string(),
            dimensions: 1536,
            max_chars: 24000,
        }
    }

    pub fn default_config() -> ModelConfig {
        text_embedding_3_small()
    }

    pub fn get_config(model: &str) -> ModelConfig {
        match model {
            "text-embedding-3-small" => text_embedding_3_small(),
            "text-embedding-3-large" => text_embedding_3_large(),
            "text-embedding-ada-002" => text_embedding_ada_002(),
            _ => ModelConfig {
                name: model.to_string(),
                dimensions: 1536, // Default assumption
                max_chars: 24000,
            },
        }
    }
}
