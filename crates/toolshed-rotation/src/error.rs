//! Error types for credential rotation

/// Errors that can occur during rotation operations
#[derive(Debug, thiserror::Error)]
pub enum RotationError {
    /// A helper program (`op`, `osascript`, a hook) could not be started
    #[error("Failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Subprocess exited with non-zero status
    #[error("`{command}` failed (exit code {code}): {stderr}")]
    CommandFailed {
        /// Program and subcommand, without secret arguments
        command: String,
        code: i32,
        stderr: String,
    },

    /// A rotator could not produce a new credential
    #[error("{0}")]
    Generation(String),

    /// Service name not present in settings or policy overrides
    #[error("Unknown service: {0}")]
    UnknownService(String),

    /// Service is marked automated but nothing can rotate it
    #[error("No automated rotator registered for {0}")]
    NoRotator(String),

    /// Policy value rejected
    #[error("Invalid rotation policy: {0}")]
    InvalidPolicy(String),

    /// Error parsing command output
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    #[error(transparent)]
    Fs(#[from] toolshed_fs::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for rotation operations
pub type Result<T> = std::result::Result<T, RotationError>;
