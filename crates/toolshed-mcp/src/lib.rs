//! MCP server for toolshed
//!
//! Exposes the Obsidian vault (read-only), credential rotation and the LLM
//! router to MCP clients over JSON-RPC 2.0 on stdio.
//!
//! ```text
//! [ MCP Client (Claude Desktop/IDE) ]
//!        | (JSON-RPC, one message per line)
//!        v
//! [ toolshed-mcp ] ---> stderr (logs)
//!        |
//!        +--> [ Vault ] ------------> toolshed-fs sandbox
//!        +--> [ RotationManager ] --> audit.jsonl, 1Password CLI
//!        +--> [ Router ] -----------> Ollama / OpenAI / Anthropic / Gemini
//! ```
//!
//! # Resources
//!
//! - `vault://daily/<date>` - A daily note
//! - `vault://projects` - Project folders
//! - `router://models` - The routing table

pub mod context;
pub mod error;
mod handlers;
pub mod protocol;
pub mod resource_handlers;
pub mod resources;
pub mod server;
pub mod tools;
pub mod vault;

pub use context::ServerContext;
pub use error::{Error, Result};
pub use handlers::handle_tool_call;
pub use server::ToolshedMcpServer;
pub use tools::{ToolContent, ToolDefinition, ToolResult, get_tool_definitions};
pub use vault::Vault;

use toolshed_core::Settings;

/// Build the production context from `settings` and serve stdio until EOF.
pub async fn serve(settings: Settings) -> Result<()> {
    settings.validate()?;
    let server = ToolshedMcpServer::new(ServerContext::from_settings(settings)?);
    server.run().await
}
