//! Database schema definitions for the SQLite vector store.

use rusqlite::Connection;

/// The complete SQL schema for the index database.
///
/// Embeddings are stored as little-endian f32 blobs; `dimensions`
/// records the vector length so mixed-model collections are detectable.
/// Timestamps are Unix milliseconds.
pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS collections (
    name TEXT PRIMARY KEY,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS entries (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    document TEXT NOT NULL,
    embedding BLOB NOT NULL,
    dimensions INTEGER NOT NULL,
    phrase TEXT NOT NULL,
    phrase_length INTEGER NOT NULL,
    PRIMARY KEY (collection, id),
    FOREIGN KEY (collection) REFERENCES collections(name) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_entries_collection ON entries(collection);
";

/// Apply the schema to a fresh or existing connection.
///
/// Idempotent; every statement is `IF NOT EXISTS`.
pub fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
