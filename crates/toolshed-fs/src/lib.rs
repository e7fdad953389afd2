//! Filesystem layer for toolshed
//!
//! Provides the vault sandbox (canonicalize, then check ancestry), normalized
//! display paths, and lock-protected I/O used by the audit log and config store.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod sandbox;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::NormalizedPath;
pub use sandbox::VaultRoot;
