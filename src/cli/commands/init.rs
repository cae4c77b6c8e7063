//! `gday init` - build the vector index from the corpus.

use colored::Colorize;

use crate::config::Config;
use crate::error::{Error, Result};

pub fn execute(config: &Config, json: bool) -> Result<()> {
    let engine = super::build_engine(config)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;
    let count = rt.block_on(engine.rebuild())?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "status": "success",
                "collection": engine.collection(),
                "indexed": count,
            })
        );
    } else {
        println!(
            "{} indexed {} entries into '{}'",
            "ok".green().bold(),
            count,
            engine.collection()
        );
    }

    Ok(())
}
