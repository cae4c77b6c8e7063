//! Corpus of Australian slang entries.
//!
//! Loads the canonical phrase list from a JSON data file. Loading never
//! fails from the caller's point of view: a missing or malformed file
//! degrades to a built-in two-entry corpus so there is always something
//! to index and query. The degrade is logged.

use crate::error::{Error, Result};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One corpus record: a slang phrase, its meaning, and a usage example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlangEntry {
    pub phrase: String,
    pub meaning: String,
    pub usage_example: String,
}

/// Built-in minimal corpus used when the data file cannot be read.
#[must_use]
pub fn fallback_corpus() -> Vec<SlangEntry> {
    vec![
        SlangEntry {
            phrase: "G'day".to_string(),
            meaning: "Hello, good day".to_string(),
            usage_example: "G'day mate, how's it going?".to_string(),
        },
        SlangEntry {
            phrase: "Fair dinkum".to_string(),
            meaning: "True, genuine, authentic".to_string(),
            usage_example: "Is that fair dinkum or are you pulling my leg?".to_string(),
        },
    ]
}

/// Source of truth for (re)indexing: the slang phrase list on disk.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    path: PathBuf,
}

impl CorpusStore {
    /// Create a store reading from the given data file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The data file this store reads.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the corpus, degrading to the built-in fallback on any
    /// read or parse failure.
    ///
    /// The fallback-on-error behavior is a deliberate availability
    /// policy: the index must always have something to serve.
    #[must_use]
    pub fn load(&self) -> Vec<SlangEntry> {
        match self.read() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(
                    "corpus load failed, using built-in fallback corpus: {e}"
                );
                fallback_corpus()
            }
        }
    }

    /// Read and parse the data file without the fallback.
    ///
    /// # Errors
    ///
    /// Returns `Error::CorpusLoad` when the file is missing, unreadable,
    /// or not a JSON array of entries.
    pub fn read(&self) -> Result<Vec<SlangEntry>> {
        let content = fs::read_to_string(&self.path).map_err(|e| Error::CorpusLoad {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| Error::CorpusLoad {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Uniformly pick one entry from the loaded corpus.
    ///
    /// `None` only when the data file parses to an empty array; callers
    /// supply their own fallback messaging for that case.
    #[must_use]
    pub fn random_entry(&self) -> Option<SlangEntry> {
        let entries = self.load();
        entries.choose(&mut rand::thread_rng()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_corpus(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_corpus() {
        let file = write_corpus(
            r#"[{"phrase":"Arvo","meaning":"Afternoon","usage_example":"See you this arvo."}]"#,
        );
        let store = CorpusStore::new(file.path());
        let entries = store.load();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].phrase, "Arvo");
    }

    #[test]
    fn test_missing_file_falls_back_to_builtin() {
        let store = CorpusStore::new("/nonexistent/australianisms.json");
        let entries = store.load();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].phrase, "G'day");
        assert_eq!(entries[1].phrase, "Fair dinkum");
    }

    #[test]
    fn test_malformed_file_falls_back_to_builtin() {
        let file = write_corpus("not json at all {");
        let store = CorpusStore::new(file.path());
        let entries = store.load();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_read_reports_corpus_load_error() {
        let store = CorpusStore::new("/nonexistent/australianisms.json");
        let err = store.read().unwrap_err();
        assert!(matches!(err, Error::CorpusLoad { .. }));
    }

    #[test]
    fn test_random_entry_comes_from_corpus() {
        let file = write_corpus(
            r#"[{"phrase":"Arvo","meaning":"Afternoon","usage_example":"See you this arvo."}]"#,
        );
        let store = CorpusStore::new(file.path());
        let entry = store.random_entry().unwrap();
        assert_eq!(entry.phrase, "Arvo");
    }

    #[test]
    fn test_random_entry_on_empty_corpus_is_none() {
        let file = write_corpus("[]");
        let store = CorpusStore::new(file.path());
        assert!(store.random_entry().is_none());
    }
}
