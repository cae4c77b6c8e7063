//! Query-time orchestration and ranking.
//!
//! The retrieval engine wires the embedding client, the vector store,
//! and the corpus together: embed the query, fetch k nearest neighbors,
//! convert distances to similarity scores, filter by threshold, and
//! hand back matches in the store's nearest-first order. The engine
//! never re-sorts.
//!
//! Every failure mode degrades: provider outages become zero-vector
//! queries, a missing index is rebuilt lazily from the corpus, and an
//! unparseable stored document becomes a partial match. Zero surviving
//! matches is a valid result, not an error.

use crate::corpus::{CorpusStore, SlangEntry};
use crate::embeddings::{embed_or_zero, BoxedProvider};
use crate::error::{Error, Result};
use crate::index::{IndexedEntry, Neighbor, VectorStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A result record returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub phrase: String,
    pub meaning: String,
    pub usage_example: String,
    /// Similarity score, higher is better. Comparable only within one
    /// store backend.
    pub score: f32,
}

/// Convert a backend distance to a similarity score.
///
/// Valid for distance metrics bounded in [0, 2] (the SQLite adapter's
/// cosine distance). A different backend metric means replacing this
/// conversion, not reusing it.
#[must_use]
pub fn similarity_from_distance(distance: f32) -> f32 {
    2.0 - distance
}

/// Build a [`Match`] from a stored neighbor.
///
/// An unparseable document degrades to a partial match: first line as
/// the phrase, unknown meaning/usage, and the raw distance (not the
/// similarity) as the score. The score inconsistency in the degraded
/// branch is kept for compatibility with existing consumers.
fn match_from_neighbor(neighbor: &Neighbor) -> Match {
    let similarity = similarity_from_distance(neighbor.distance);
    match serde_json::from_str::<SlangEntry>(&neighbor.document) {
        Ok(entry) => Match {
            phrase: entry.phrase,
            meaning: entry.meaning,
            usage_example: entry.usage_example,
            score: similarity,
        },
        Err(e) => {
            warn!("stored document is not valid JSON, serving partial match: {e}");
            Match {
                phrase: neighbor
                    .document
                    .lines()
                    .next()
                    .unwrap_or(&neighbor.document)
                    .to_string(),
                meaning: "Unknown".to_string(),
                usage_example: "Unknown".to_string(),
                score: neighbor.distance,
            }
        }
    }
}

/// Retrieval engine over a vector store and an embedding provider.
pub struct RetrievalEngine<S: VectorStore> {
    provider: BoxedProvider,
    store: S,
    corpus: CorpusStore,
    collection: String,
    /// Serializes rebuilds of this engine's collection. The collection
    /// is briefly absent between delete and create; two interleaved
    /// rebuilds would double-embed and could leave a partial index.
    rebuild_lock: tokio::sync::Mutex<()>,
}

impl<S: VectorStore> RetrievalEngine<S> {
    /// Create an engine for one named collection.
    pub fn new(
        provider: BoxedProvider,
        store: S,
        corpus: CorpusStore,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            store,
            corpus,
            collection: collection.into(),
            rebuild_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Rebuild the index from the current corpus file.
    ///
    /// Returns the number of entries indexed.
    ///
    /// # Errors
    ///
    /// Returns an error when the store cannot be written. Provider
    /// failures do not error; affected entries are indexed with zero
    /// vectors.
    pub async fn rebuild(&self) -> Result<usize> {
        let entries = self.corpus.load();
        self.rebuild_with(&entries).await
    }

    /// Rebuild the index from an explicit entry list.
    ///
    /// Full replacement, not incremental: the prior collection is
    /// deleted and recreated. Embedding happens before any store
    /// mutation so the delete-to-create window stays as small as the
    /// SQLite writes themselves. The window is still a real gap;
    /// queries racing it take the self-healing path in [`Self::search`].
    pub async fn rebuild_with(&self, entries: &[SlangEntry]) -> Result<usize> {
        let _guard = self.rebuild_lock.lock().await;

        let mut indexed = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let text = format!("{} - {}", entry.phrase, entry.meaning);
            let embedding = embed_or_zero(&self.provider, &text).await;
            indexed.push(IndexedEntry {
                id: format!("phrase_{i}"),
                document: serde_json::to_string(entry)?,
                embedding,
                phrase: entry.phrase.clone(),
                phrase_length: entry.phrase.len(),
            });
        }

        self.store.delete(&self.collection)?;
        self.store.create(&self.collection)?;
        self.store.add(&self.collection, &indexed)?;

        info!(
            collection = %self.collection,
            count = indexed.len(),
            "rebuilt index"
        );
        Ok(indexed.len())
    }

    /// Search the index for entries matching `query`.
    ///
    /// Returns up to `max_results` matches with similarity at or above
    /// `threshold`, nearest-first. An empty list is a valid result.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store itself fails; provider and
    /// parse failures degrade per the module policy.
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        threshold: f32,
    ) -> Result<Vec<Match>> {
        let embedding = embed_or_zero(&self.provider, query).await;

        let neighbors = match self.store.query(&self.collection, &embedding, max_results) {
            Ok(neighbors) => neighbors,
            Err(Error::IndexNotFound { name }) => {
                // Self-healing: first query after a fresh install, or a
                // query that raced a rebuild's delete window.
                info!(collection = %name, "index not found, rebuilding from corpus");
                self.rebuild().await?;
                self.store.query(&self.collection, &embedding, max_results)?
            }
            Err(e) => return Err(e),
        };

        let matches = neighbors
            .iter()
            .filter(|n| similarity_from_distance(n.distance) >= threshold)
            .map(match_from_neighbor)
            .take(max_results)
            .collect();

        Ok(matches)
    }

    /// Uniformly pick one corpus entry, for "give me something" queries.
    #[must_use]
    pub fn random_entry(&self) -> Option<SlangEntry> {
        self.corpus.random_entry()
    }

    /// Number of entries currently indexed.
    ///
    /// # Errors
    ///
    /// `Error::IndexNotFound` when the collection has never been built.
    pub fn indexed_count(&self) -> Result<usize> {
        self.store.count(&self.collection)
    }

    /// The collection this engine serves.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{EmbeddingProvider, ProviderInfo};
    use crate::index::SqliteStore;
    use std::io::Write;

    const DIMS: usize = 4;

    /// Deterministic keyword-feature embeddings for tests.
    ///
    /// Each feature group lights up one component; a small shared base
    /// component keeps every embedding non-zero.
    fn mock_embedding(text: &str) -> Vec<f32> {
        let t = text.to_lowercase();
        let groups: [&[&str]; 3] = [
            &["hello", "g'day", "good day"],
            &["genuine", "true", "dinkum", "authentic"],
            &["afternoon", "arvo"],
        ];
        let mut v = vec![0.0; DIMS];
        for (i, words) in groups.iter().enumerate() {
            if words.iter().any(|w| t.contains(w)) {
                v[i] = 1.0;
            }
        }
        v[DIMS - 1] = 0.1;
        v
    }

    struct MockProvider;

    impl EmbeddingProvider for MockProvider {
        fn info(&self) -> ProviderInfo {
            ProviderInfo {
                name: "mock".to_string(),
                model: "keyword-features".to_string(),
                dimensions: DIMS,
                max_chars: 1000,
                available: true,
            }
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(mock_embedding(text))
        }
    }

    struct FailingProvider;

    impl EmbeddingProvider for FailingProvider {
        fn info(&self) -> ProviderInfo {
            ProviderInfo {
                name: "failing".to_string(),
                model: "none".to_string(),
                dimensions: DIMS,
                max_chars: 1000,
                available: false,
            }
        }

        async fn is_available(&self) -> bool {
            false
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::Provider("forced failure".into()))
        }
    }

    fn two_entry_corpus() -> Vec<SlangEntry> {
        vec![
            SlangEntry {
                phrase: "G'day".to_string(),
                meaning: "Hello, good day".to_string(),
                usage_example: "G'day mate!".to_string(),
            },
            SlangEntry {
                phrase: "Fair dinkum".to_string(),
                meaning: "Genuine, true".to_string(),
                usage_example: "Is that fair dinkum?".to_string(),
            },
        ]
    }

    /// Engine over an in-memory store, a mock provider, and a corpus
    /// store pointed at a nonexistent path (built-in fallback corpus).
    fn engine() -> RetrievalEngine<SqliteStore> {
        RetrievalEngine::new(
            BoxedProvider::new(MockProvider),
            SqliteStore::open_in_memory().unwrap(),
            CorpusStore::new("/nonexistent/australianisms.json"),
            "australianisms",
        )
    }

    #[tokio::test]
    async fn test_search_respects_max_results() {
        let engine = engine();
        engine.rebuild_with(&two_entry_corpus()).await.unwrap();

        for k in 0..4 {
            let matches = engine.search("hello", k, 0.0).await.unwrap();
            assert!(matches.len() <= k);
        }
    }

    #[tokio::test]
    async fn test_gday_scenario() {
        let engine = engine();
        engine.rebuild_with(&two_entry_corpus()).await.unwrap();

        let matches = engine.search("hello", 1, 0.0).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].phrase, "G'day");
        assert_eq!(matches[0].meaning, "Hello, good day");
    }

    #[tokio::test]
    async fn test_round_trip_top_match() {
        let engine = engine();
        let corpus = two_entry_corpus();
        engine.rebuild_with(&corpus).await.unwrap();

        for entry in &corpus {
            let probe = format!("{} - {}", entry.phrase, entry.meaning);
            let matches = engine.search(&probe, 1, 0.0).await.unwrap();
            assert_eq!(matches[0].phrase, entry.phrase);
            assert!(matches[0].score >= 0.0);
        }
    }

    #[tokio::test]
    async fn test_threshold_filters_low_scores() {
        let engine = engine();
        engine.rebuild_with(&two_entry_corpus()).await.unwrap();

        // "hello" matches G'day strongly and Fair dinkum barely.
        let loose = engine.search("hello", 3, 0.5).await.unwrap();
        let strict = engine.search("hello", 3, 1.5).await.unwrap();

        assert!(strict.len() <= loose.len());
        // The strict result set is a prefix of the loose one.
        for (s, l) in strict.iter().zip(loose.iter()) {
            assert_eq!(s.phrase, l.phrase);
        }
        assert!(strict.iter().all(|m| m.score >= 1.5));
    }

    #[tokio::test]
    async fn test_results_are_nearest_first() {
        let engine = engine();
        engine.rebuild_with(&two_entry_corpus()).await.unwrap();

        let matches = engine.search("hello", 3, 0.0).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].phrase, "G'day");
        assert!(matches[0].score >= matches[1].score);
    }

    #[tokio::test]
    async fn test_rebuild_is_idempotent() {
        let engine = engine();
        let corpus = two_entry_corpus();

        let first = engine.rebuild_with(&corpus).await.unwrap();
        let top_before = engine.search("hello", 1, 0.0).await.unwrap();

        let second = engine.rebuild_with(&corpus).await.unwrap();
        let top_after = engine.search("hello", 1, 0.0).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(engine.indexed_count().unwrap(), 2);
        assert_eq!(top_before[0].phrase, top_after[0].phrase);
    }

    #[tokio::test]
    async fn test_empty_rebuild_yields_empty_searches() {
        let engine = engine();
        let count = engine.rebuild_with(&[]).await.unwrap();
        assert_eq!(count, 0);
        assert_eq!(engine.indexed_count().unwrap(), 0);

        let matches = engine.search("anything", 3, 0.0).await.unwrap();
        assert!(matches.is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_low_scores() {
        let degraded = RetrievalEngine::new(
            BoxedProvider::new(FailingProvider),
            SqliteStore::open_in_memory().unwrap(),
            CorpusStore::new("/nonexistent/australianisms.json"),
            "australianisms",
        );
        degraded.rebuild_with(&two_entry_corpus()).await.unwrap();

        let matches = degraded.search("anything", 3, 0.5).await.unwrap();
        assert!(matches.is_empty());

        // With no threshold, matches surface but every score is low.
        let unfiltered = degraded.search("anything", 3, 0.0).await.unwrap();
        assert!(unfiltered.iter().all(|m| m.score < 0.5));
    }

    #[tokio::test]
    async fn test_search_self_heals_missing_index() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            serde_json::to_string(&two_entry_corpus())
                .unwrap()
                .as_bytes(),
        )
        .unwrap();

        let engine = RetrievalEngine::new(
            BoxedProvider::new(MockProvider),
            SqliteStore::open_in_memory().unwrap(),
            CorpusStore::new(file.path()),
            "australianisms",
        );

        // No rebuild was ever run; the first search must build the
        // index from the corpus and then answer.
        let matches = engine.search("hello", 1, 0.0).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].phrase, "G'day");
        assert_eq!(engine.indexed_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_corpus_file_indexes_fallback() {
        let engine = engine();
        let count = engine.rebuild().await.unwrap();
        assert_eq!(count, 2);

        let matches = engine.search("hello", 1, 0.0).await.unwrap();
        assert_eq!(matches[0].phrase, "G'day");
    }

    #[tokio::test]
    async fn test_unparseable_document_degrades_to_partial_match() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create("australianisms").unwrap();
        store
            .add(
                "australianisms",
                &[IndexedEntry {
                    id: "phrase_0".to_string(),
                    document: "Ripper\nnot json".to_string(),
                    embedding: mock_embedding("hello"),
                    phrase: "Ripper".to_string(),
                    phrase_length: 6,
                }],
            )
            .unwrap();

        let engine = RetrievalEngine::new(
            BoxedProvider::new(MockProvider),
            store,
            CorpusStore::new("/nonexistent/australianisms.json"),
            "australianisms",
        );

        let matches = engine.search("hello", 1, 0.0).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].phrase, "Ripper");
        assert_eq!(matches[0].meaning, "Unknown");
        assert_eq!(matches[0].usage_example, "Unknown");
        // Degraded path keeps the raw distance as the score.
        assert!(matches[0].score <= 0.1);
    }

    #[test]
    fn test_similarity_conversion_bounds() {
        assert!((similarity_from_distance(0.0) - 2.0).abs() < f32::EPSILON);
        assert!((similarity_from_distance(2.0) - 0.0).abs() < f32::EPSILON);
    }
}
