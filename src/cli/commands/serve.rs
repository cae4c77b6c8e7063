//! `gday serve` - run the HTTP server.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::server::Server;

pub fn execute(config: &Config) -> Result<()> {
    let server = Server::from_config(config)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;
    rt.block_on(server.start())
}
