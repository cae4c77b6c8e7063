//! Error types for the G'Day retrieval service.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 7=config, 9=provider)
//! - Retryability flags for transient failures
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Most failures in the retrieval core never surface here: provider
//! failures degrade to zero-vectors, a missing corpus file degrades to
//! the built-in fallback corpus, and a missing index triggers a lazy
//! rebuild. The variants below exist so each degrade site has a typed
//! error to match on before it absorbs the failure.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for G'Day operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Agents match on the string; shell scripts on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    DatabaseError,

    // Not Found (exit 3)
    IndexNotFound,

    // Corpus (exit 4)
    CorpusLoadError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Embedding provider (exit 9)
    ProviderError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::IndexNotFound => "INDEX_NOT_FOUND",
            Self::CorpusLoadError => "CORPUS_LOAD_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::ProviderError => "PROVIDER_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-9).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::DatabaseError => 2,
            Self::IndexNotFound => 3,
            Self::CorpusLoadError => 4,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
            Self::ProviderError => 9,
        }
    }

    /// Whether a caller should retry without changing anything.
    ///
    /// True for transient failures (provider unreachable, database
    /// contention). False for config, not-found, or internal errors.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderError | Self::DatabaseError)
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in G'Day operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding provider error: {0}")]
    Provider(String),

    #[error("Index not found: {name}")]
    IndexNotFound { name: String },

    #[error("Failed to load corpus from {}: {reason}", path.display())]
    CorpusLoad { path: PathBuf, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Provider(_) => ErrorCode::ProviderError,
            Self::IndexNotFound { .. } => ErrorCode::IndexNotFound,
            Self::CorpusLoad { .. } => ErrorCode::CorpusLoadError,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::Config(msg) if msg.contains("OPENAI_API_KEY") => Some(
                "Set OPENAI_API_KEY in the environment or under \
                 `embeddings.OPENAI_API_KEY` in ~/.gday/config.json"
                    .to_string(),
            ),

            Self::IndexNotFound { name } => Some(format!(
                "Collection '{name}' has not been built yet. Run `gday init` to index the corpus."
            )),

            Self::CorpusLoad { path, .. } => Some(format!(
                "Check that {} exists and is a JSON array of \
                 {{phrase, meaning, usage_example}} objects.",
                path.display()
            )),

            _ => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_category() {
        assert_eq!(Error::Config("no key".into()).exit_code(), 7);
        assert_eq!(Error::Provider("timeout".into()).exit_code(), 9);
        assert_eq!(
            Error::IndexNotFound {
                name: "australianisms".into()
            }
            .exit_code(),
            3
        );
        assert_eq!(Error::Other("boom".into()).exit_code(), 1);
    }

    #[test]
    fn test_provider_errors_are_retryable() {
        assert!(Error::Provider("503".into()).error_code().is_retryable());
        assert!(!Error::Config("missing".into()).error_code().is_retryable());
    }

    #[test]
    fn test_structured_json_shape() {
        let err = Error::IndexNotFound {
            name: "australianisms".into(),
        };
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "INDEX_NOT_FOUND");
        assert_eq!(json["error"]["exit_code"], 3);
        assert!(json["error"]["hint"].as_str().unwrap().contains("gday init"));
    }

    #[test]
    fn test_missing_key_hint() {
        let err = Error::Config("OPENAI_API_KEY not set".into());
        assert!(err.hint().unwrap().contains("OPENAI_API_KEY"));
    }
}
