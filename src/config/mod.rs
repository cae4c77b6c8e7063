//! Configuration for the G'Day retrieval service.
//!
//! All tunables are collected into one explicit [`Config`] struct that is
//! assembled once at startup and passed into each component's constructor.
//! Resolution order for every setting:
//!
//! 1. Environment variable
//! 2. `~/.gday/config.json`
//! 3. Built-in default
//!
//! Environment variables:
//! - `OPENAI_API_KEY` - Embedding provider credential
//! - `OPENAI_ENDPOINT` - Provider base URL (default: `https://api.openai.com`)
//! - `EMBEDDING_MODEL` - Embedding model (default: `text-embedding-3-small`)
//! - `AUSTRALIANISMS_PATH` - Corpus file (default: `./data/australianisms.json`)
//! - `GDAY_INDEX_PATH` - Index database (default: `~/.gday/data/index.db`)
//! - `COLLECTION_NAME` - Index collection name (default: `australianisms`)
//! - `GDAY_MAX_RESULTS` / `GDAY_THRESHOLD` - Search defaults
//! - `GDAY_HOST` / `GDAY_PORT` - HTTP server bind address

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default similarity threshold below which matches are dropped.
pub const DEFAULT_THRESHOLD: f32 = 0.7;

/// Default maximum number of matches returned per search.
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Embedding settings stored in `~/.gday/config.json`.
///
/// Field names match the environment variable spelling so a setting can
/// be moved between the two without renaming.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct EmbeddingSettings {
    pub OPENAI_API_KEY: Option<String>,
    pub OPENAI_ENDPOINT: Option<String>,
    pub EMBEDDING_MODEL: Option<String>,
}

/// Retrieval settings stored in `~/.gday/config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalSettings {
    pub corpus_path: Option<PathBuf>,
    pub index_path: Option<PathBuf>,
    pub collection: Option<String>,
    pub max_results: Option<usize>,
    pub threshold: Option<f32>,
}

/// G'Day local configuration file structure.
///
/// Stored at `~/.gday/config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub embeddings: Option<EmbeddingSettings>,
    pub retrieval: Option<RetrievalSettings>,
}

/// Get the config file path.
fn config_path() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|b| b.home_dir().join(".gday").join("config.json"))
        .ok_or(Error::Config("Could not determine home directory".into()))
}

/// Load the full G'Day configuration file.
///
/// A missing file is not an error; defaults apply.
pub fn load_file_config() -> Result<FileConfig> {
    let path = config_path()?;

    if !path.exists() {
        return Ok(FileConfig::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse config file: {e}")))
}

fn env_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}

/// Resolve the embedding provider credential from env or config.
///
/// `None` means no credential is configured; the provider constructor
/// turns that into a `Config` error before any network call.
pub fn resolve_api_key() -> Option<String> {
    if let Some(key) = env_var("OPENAI_API_KEY") {
        return Some(key);
    }

    if let Ok(config) = load_file_config() {
        if let Some(embeddings) = config.embeddings {
            return embeddings.OPENAI_API_KEY;
        }
    }

    None
}

/// Resolve the embedding provider base URL from env or config.
pub fn resolve_embedding_endpoint() -> String {
    if let Some(endpoint) = env_var("OPENAI_ENDPOINT") {
        return endpoint;
    }

    if let Ok(config) = load_file_config() {
        if let Some(endpoint) = config.embeddings.and_then(|e| e.OPENAI_ENDPOINT) {
            return endpoint;
        }
    }

    "https://api.openai.com".to_string()
}

/// Resolve the embedding model identifier from env or config.
pub fn resolve_embedding_model() -> String {
    if let Some(model) = env_var("EMBEDDING_MODEL") {
        return model;
    }

    if let Ok(config) = load_file_config() {
        if let Some(model) = config.embeddings.and_then(|e| e.EMBEDDING_MODEL) {
            return model;
        }
    }

    "text-embedding-3-small".to_string()
}

/// Resolve the corpus data file path from env or config.
pub fn resolve_corpus_path() -> PathBuf {
    if let Some(path) = env_var("AUSTRALIANISMS_PATH") {
        return PathBuf::from(path);
    }

    if let Ok(config) = load_file_config() {
        if let Some(path) = config.retrieval.and_then(|r| r.corpus_path) {
            return path;
        }
    }

    PathBuf::from("./data/australianisms.json")
}

/// Resolve the index database path from env or config.
///
/// Falls back to the current directory when no home directory exists.
pub fn resolve_index_path() -> PathBuf {
    if let Some(path) = env_var("GDAY_INDEX_PATH") {
        return PathBuf::from(path);
    }

    if let Ok(config) = load_file_config() {
        if let Some(path) = config.retrieval.and_then(|r| r.index_path) {
            return path;
        }
    }

    directories::BaseDirs::new()
        .map(|b| b.home_dir().join(".gday").join("data").join("index.db"))
        .unwrap_or_else(|| PathBuf::from("./gday-index.db"))
}

/// Resolve the index collection name from env or config.
pub fn resolve_collection() -> String {
    if let Some(name) = env_var("COLLECTION_NAME") {
        return name;
    }

    if let Ok(config) = load_file_config() {
        if let Some(name) = config.retrieval.and_then(|r| r.collection) {
            return name;
        }
    }

    "australianisms".to_string()
}

fn resolve_max_results() -> usize {
    env_var("GDAY_MAX_RESULTS")
        .and_then(|v| v.parse().ok())
        .or_else(|| {
            load_file_config()
                .ok()
                .and_then(|c| c.retrieval.and_then(|r| r.max_results))
        })
        .unwrap_or(DEFAULT_MAX_RESULTS)
}

fn resolve_threshold() -> f32 {
    env_var("GDAY_THRESHOLD")
        .and_then(|v| v.parse().ok())
        .or_else(|| {
            load_file_config()
                .ok()
                .and_then(|c| c.retrieval.and_then(|r| r.threshold))
        })
        .unwrap_or(DEFAULT_THRESHOLD)
}

/// Resolved runtime configuration.
///
/// Built once by [`Config::load`] and passed into component constructors,
/// so components never read process-wide environment state themselves.
#[derive(Debug, Clone)]
pub struct Config {
    /// Embedding provider credential, if configured.
    pub api_key: Option<String>,
    /// Embedding provider base URL.
    pub embedding_endpoint: String,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Corpus data file.
    pub corpus_path: PathBuf,
    /// Index database file.
    pub index_path: PathBuf,
    /// Index collection name.
    pub collection: String,
    /// Default maximum matches per search.
    pub max_results: usize,
    /// Default similarity threshold.
    pub threshold: f32,
    /// HTTP server bind host.
    pub host: String,
    /// HTTP server bind port.
    pub port: u16,
}

impl Config {
    /// Load configuration from environment, config file, and defaults.
    #[must_use]
    pub fn load() -> Self {
        Self {
            api_key: resolve_api_key(),
            embedding_endpoint: resolve_embedding_endpoint(),
            embedding_model: resolve_embedding_model(),
            corpus_path: resolve_corpus_path(),
            index_path: resolve_index_path(),
            collection: resolve_collection(),
            max_results: resolve_max_results(),
            threshold: resolve_threshold(),
            host: env_var("GDAY_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_var("GDAY_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        }
    }
}
