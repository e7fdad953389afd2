//! toolshed MCP server
//!
//! # Usage
//!
//! ```bash
//! toolshed-mcp [--config <path>]
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Control log verbosity (default: `toolshed=info`)
//! - `VAULT_PATH`, `OLLAMA_BASE_URL`, provider API keys: see `toolshed.toml`
//!
//! Requests and responses go through stdout; logs go to stderr.

use std::path::PathBuf;

use clap::Parser;
use toolshed_core::SettingsLoader;

/// MCP server for the toolshed vault, rotation and router tools
#[derive(Parser)]
#[command(name = "toolshed-mcp")]
#[command(about = "MCP server for the toolshed vault, rotation and router tools")]
#[command(version)]
struct Args {
    /// Path to toolshed.toml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout is reserved for the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("toolshed=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let settings = SettingsLoader::new().with_explicit(args.config).load()?;

    tracing::info!(
        config = ?settings.source,
        vault = ?settings.vault.root,
        "Starting toolshed-mcp server"
    );

    toolshed_mcp::serve(settings).await?;

    Ok(())
}
