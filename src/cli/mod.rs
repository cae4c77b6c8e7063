//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// G'Day - Australian slang retrieval service
#[derive(Parser, Debug)]
#[command(name = "gday", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Index database path (default: ~/.gday/data/index.db)
    #[arg(long, global = true, env = "GDAY_INDEX_PATH")]
    pub db: Option<PathBuf>,

    /// Corpus data file (default: ./data/australianisms.json)
    #[arg(long, global = true, env = "AUSTRALIANISMS_PATH")]
    pub corpus: Option<PathBuf>,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Bind host
        #[arg(long, env = "GDAY_HOST")]
        host: Option<String>,

        /// Bind port
        #[arg(long, env = "GDAY_PORT")]
        port: Option<u16>,
    },

    /// Build (or rebuild) the vector index from the corpus
    Init,

    /// Search the corpus for a slang phrase
    Query(QueryArgs),

    /// Print a random slang entry
    Random,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// The search query
    pub query: String,

    /// Maximum number of matches to return
    #[arg(long, short = 'n')]
    pub max_results: Option<usize>,

    /// Minimum similarity score for a match
    #[arg(long, short = 't')]
    pub threshold: Option<f32>,
}
