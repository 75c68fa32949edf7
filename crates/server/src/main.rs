//! MCP stdio server for Federal Acquisition Regulation search.
//!
//! Runs until the hosting agent runtime closes the pipe. Stdout carries the
//! MCP protocol, so all logging goes to stderr.

mod server;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("starting far-oracle-mcp stdio server");
    server::serve_stdio().await
}
