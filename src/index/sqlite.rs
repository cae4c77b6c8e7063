//! SQLite vector store adapter.
//!
//! Persists one embedding per corpus entry and answers k-nearest-neighbor
//! queries with a brute-force cosine-distance scan. The database survives
//! process restarts.

use crate::error::{Error, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use super::{schema, IndexedEntry, Neighbor, VectorStore};

/// SQLite-backed [`VectorStore`].
///
/// `rusqlite::Connection` is not `Sync`, so the connection lives behind
/// a mutex and every method locks it for the duration of the call.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the index database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error when the parent directory cannot be created or
    /// the database cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        schema::apply(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store (tests).
    ///
    /// # Errors
    ///
    /// Returns an error when the database cannot be initialized.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::apply(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned lock means another thread panicked mid-statement;
        // the connection itself is still usable for our read/replace load.
        self.conn.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Encode an embedding as a little-endian f32 blob.
fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decode a little-endian f32 blob back into an embedding.
fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect()
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero-magnitude vectors.
/// [`cosine_distance`] widens those cases to the maximum distance.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot_product = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let magnitude = (norm_a * norm_b).sqrt();
    if magnitude == 0.0 {
        0.0
    } else {
        dot_product / magnitude
    }
}

/// Cosine distance, bounded in [0, 2].
///
/// Zero-magnitude and mismatched-length vectors get the maximum
/// distance so degraded zero-vector queries (and stale entries embedded
/// with a different model) rank below every real neighbor.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let zero_magnitude = |v: &[f32]| v.iter().all(|x| *x == 0.0);
    if a.len() != b.len() || a.is_empty() || zero_magnitude(a) || zero_magnitude(b) {
        return 2.0;
    }
    1.0 - cosine_similarity(a, b)
}

impl VectorStore for SqliteStore {
    fn exists(&self, name: &str) -> Result<bool> {
        let conn = self.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM collections WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn create(&self, name: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO collections (name, created_at) VALUES (?1, ?2)",
            params![name, chrono::Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<()> {
        let conn = self.lock();
        conn.execute("DELETE FROM entries WHERE collection = ?1", [name])?;
        conn.execute("DELETE FROM collections WHERE name = ?1", [name])?;
        Ok(())
    }

    fn add(&self, name: &str, entries: &[IndexedEntry]) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO entries
                 (collection, id, document, embedding, dimensions, phrase, phrase_length)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for entry in entries {
                stmt.execute(params![
                    name,
                    entry.id,
                    entry.document,
                    embedding_to_blob(&entry.embedding),
                    entry.embedding.len() as i64,
                    entry.phrase,
                    entry.phrase_length as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn query(&self, name: &str, embedding: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if !self.exists(name)? {
            return Err(Error::IndexNotFound {
                name: name.to_string(),
            });
        }

        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT document, embedding FROM entries WHERE collection = ?1")?;
        let rows = stmt.query_map([name], |row| {
            let document: String = row.get(0)?;
            let blob: Vec<u8> = row.get(1)?;
            Ok((document, blob_to_embedding(&blob)))
        })?;

        let mut neighbors: Vec<Neighbor> = rows
            .filter_map(std::result::Result::ok)
            .map(|(document, stored)| Neighbor {
                document,
                distance: cosine_distance(embedding, &stored),
            })
            .collect();

        // Nearest-first; ties keep scan order.
        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }

    fn count(&self, name: &str) -> Result<usize> {
        if !self.exists(name)? {
            return Err(Error::IndexNotFound {
                name: name.to_string(),
            });
        }

        let conn = self.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE collection = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
