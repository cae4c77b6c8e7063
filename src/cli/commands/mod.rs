//! Command handlers.

pub mod init;
pub mod query;
pub mod random;
pub mod serve;

use crate::cli::Cli;
use crate::config::Config;
use crate::corpus::CorpusStore;
use crate::embeddings::{BoxedProvider, OpenAiProvider};
use crate::error::Result;
use crate::index::SqliteStore;
use crate::retrieval::RetrievalEngine;

/// Resolve configuration, applying CLI flag overrides.
pub fn resolve_config(cli: &Cli) -> Config {
    let mut config = Config::load();
    if let Some(db) = &cli.db {
        config.index_path.clone_from(db);
    }
    if let Some(corpus) = &cli.corpus {
        config.corpus_path.clone_from(corpus);
    }
    config
}

/// Build a retrieval engine from resolved configuration.
///
/// # Errors
///
/// Returns `Error::Config` when no provider credential is configured,
/// or a database error when the index cannot be opened.
pub fn build_engine(config: &Config) -> Result<RetrievalEngine<SqliteStore>> {
    let provider = OpenAiProvider::from_config(config)?;
    let store = SqliteStore::open(&config.index_path)?;
    let corpus = CorpusStore::new(config.corpus_path.clone());

    Ok(RetrievalEngine::new(
        BoxedProvider::new(provider),
        store,
        corpus,
        config.collection.clone(),
    ))
}
