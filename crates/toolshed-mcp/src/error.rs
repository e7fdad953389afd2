//! Error types for the MCP server

use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during MCP server operations
#[derive(Debug, Error)]
pub enum Error {
    /// Settings could not be loaded or are incomplete
    #[error(transparent)]
    Core(#[from] toolshed_core::Error),

    /// Sandbox or file access failure
    #[error(transparent)]
    Fs(#[from] toolshed_fs::Error),

    #[error(transparent)]
    Rotation(#[from] toolshed_rotation::RotationError),

    #[error(transparent)]
    Router(#[from] toolshed_router::RouterError),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tool arguments missing or of the wrong shape
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Unknown tool requested
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Unknown resource requested
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// The configured vault directory does not exist
    #[error("Vault not available at {path}")]
    VaultUnavailable { path: std::path::PathBuf },

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Not a markdown file: {0}")]
    NotMarkdown(String),

    #[error("Invalid date format '{0}'. Use YYYY-MM-DD")]
    InvalidDate(String),

    /// IO error on stdio
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
