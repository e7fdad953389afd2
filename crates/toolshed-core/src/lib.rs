//! Shared settings for toolshed
//!
//! Every front end (the CLI, the MCP server) loads one [`Settings`] value at
//! startup and hands the relevant section to the vault, rotation and router
//! layers.
//!
//! ```text
//!          toolshed-cli        toolshed-mcp
//!                \                 /
//!                 +-- toolshed-core --+
//!                 |        |          |
//!        toolshed-fs  rotation     router
//! ```

pub mod config;
pub mod error;

pub use config::{
    HookCommands, ProviderKeys, RotationSettings, RouterSettings, ServiceConfig, Settings,
    SettingsLoader, VaultSettings,
};
pub use error::{Error, Result};
