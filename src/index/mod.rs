//! Persistent vector index.
//!
//! The index is an abstraction over four store primitives
//! (delete/create/add/query) so the retrieval engine stays
//! backend-agnostic. One concrete adapter is provided: [`SqliteStore`],
//! a durable SQLite-backed store doing a brute-force cosine-distance
//! scan. Brute force is the right call at corpus scale (tens of
//! entries); swap the adapter, not the engine, if that ever changes.
//!
//! # Submodules
//!
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - SQLite adapter

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;

/// An entry as persisted in the vector index.
///
/// Owned exclusively by the index; recomputed on rebuild, never mutated
/// in place.
#[derive(Debug, Clone)]
pub struct IndexedEntry {
    /// Stable identifier derived from corpus position (`phrase_{i}`).
    pub id: String,
    /// Raw document: the serialized corpus entry.
    pub document: String,
    /// Embedding of `"{phrase} - {meaning}"`.
    pub embedding: Vec<f32>,
    /// Denormalized phrase for fast filtering/display.
    pub phrase: String,
    /// Denormalized phrase length.
    pub phrase_length: usize,
}

/// A raw nearest-neighbor result: stored document plus backend distance.
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub document: String,
    pub distance: f32,
}

/// Persistent nearest-neighbor store over embeddings.
///
/// Any store with these primitives satisfies the contract. Ordering
/// guarantee: `query` returns neighbors nearest-first by the backend's
/// distance metric. Scores from different backends are not comparable.
pub trait VectorStore: Send + Sync {
    /// Whether the named collection exists.
    fn exists(&self, name: &str) -> Result<bool>;

    /// Create an empty collection.
    fn create(&self, name: &str) -> Result<()>;

    /// Drop a collection and all its entries. Missing collections are
    /// not an error.
    fn delete(&self, name: &str) -> Result<()>;

    /// Add entries to a collection.
    fn add(&self, name: &str, entries: &[IndexedEntry]) -> Result<()>;

    /// Return up to `k` nearest neighbors, nearest-first. Returns all
    /// entries when the collection holds fewer than `k`.
    ///
    /// # Errors
    ///
    /// `Error::IndexNotFound` when the collection does not exist; the
    /// caller decides whether to self-heal.
    fn query(&self, name: &str, embedding: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    /// Number of entries in a collection.
    ///
    /// # Errors
    ///
    /// `Error::IndexNotFound` when the collection does not exist.
    fn count(&self, name: &str) -> Result<usize>;
}
