//! `gday query` - one-shot search against the index.

use colored::Colorize;

use crate::cli::QueryArgs;
use crate::config::Config;
use crate::error::{Error, Result};

/// Substitute for empty or whitespace-only queries.
///
/// Caller-side policy: the engine itself never sees a blank query.
const EMPTY_QUERY_FALLBACK: &str = "Say hello";

pub fn execute(args: &QueryArgs, config: &Config, json: bool) -> Result<()> {
    let trimmed = args.query.trim();
    let query = if trimmed.is_empty() {
        EMPTY_QUERY_FALLBACK
    } else {
        trimmed
    };

    let max_results = args.max_results.unwrap_or(config.max_results);
    let threshold = args.threshold.unwrap_or(config.threshold);

    let engine = super::build_engine(config)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;
    let matches = rt.block_on(engine.search(query, max_results, threshold))?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "query": query,
                "matches": matches,
            })
        );
        return Ok(());
    }

    if matches.is_empty() {
        println!("No worries, but nothing in the corpus matches that one.");
        return Ok(());
    }

    for m in &matches {
        println!(
            "{} - {}  {}",
            m.phrase.green().bold(),
            m.meaning,
            format!("({:.2})", m.score).dimmed()
        );
        println!("  {}", m.usage_example.italic());
    }

    Ok(())
}
