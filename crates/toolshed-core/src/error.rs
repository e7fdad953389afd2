//! Error types for toolshed-core

use std::path::PathBuf;

/// Result type for toolshed-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading settings
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An explicitly requested configuration file does not exist
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// A setting has a value that cannot be used
    #[error("Invalid setting `{key}`: {reason}")]
    InvalidSetting { key: String, reason: String },

    /// No vault directory is configured or the configured one is missing
    #[error("Vault not configured: set VAULT_PATH or [vault] root in toolshed.toml")]
    VaultNotConfigured,

    /// Filesystem error from toolshed-fs
    #[error(transparent)]
    Fs(#[from] toolshed_fs::Error),
}
