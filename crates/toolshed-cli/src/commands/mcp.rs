//! `mcp`

use toolshed_core::Settings;

use super::block_on;
use crate::error::Result;

/// Serve MCP on stdio until the client closes stdin.
pub fn run_mcp(settings: Settings) -> Result<()> {
    block_on(toolshed_mcp::serve(settings))??;
    Ok(())
}
