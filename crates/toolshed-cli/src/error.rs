//! Error types for toolshed-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Settings could not be loaded
    #[error(transparent)]
    Core(#[from] toolshed_core::Error),

    #[error(transparent)]
    Rotation(#[from] toolshed_rotation::RotationError),

    #[error(transparent)]
    Router(#[from] toolshed_router::RouterError),

    #[error(transparent)]
    Mcp(#[from] toolshed_mcp::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
