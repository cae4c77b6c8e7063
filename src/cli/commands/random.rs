//! `gday random` - print a random slang entry.
//!
//! Reads the corpus directly; no index or provider credential needed.

use colored::Colorize;

use crate::config::Config;
use crate::corpus::CorpusStore;
use crate::error::Result;

pub fn execute(config: &Config, json: bool) -> Result<()> {
    let corpus = CorpusStore::new(config.corpus_path.clone());

    match corpus.random_entry() {
        Some(entry) => {
            if json {
                println!("{}", serde_json::to_string(&entry)?);
            } else {
                println!("{} - {}", entry.phrase.green().bold(), entry.meaning);
                println!("  {}", entry.usage_example.italic());
            }
        }
        None => {
            // Empty corpus file; keep the response friendly.
            if json {
                println!("{}", serde_json::json!({ "matches": [] }));
            } else {
                println!("G'day mate!");
            }
        }
    }

    Ok(())
}
