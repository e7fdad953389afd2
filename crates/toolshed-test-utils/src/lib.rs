//! Shared test utilities for the toolshed workspace.
//!
//! Dev-dependency only, never published.
//!
//! - [`vault`]: [`TestVault`](vault::TestVault), a scratch Obsidian vault with
//!   a sibling state directory and matching [`Settings`](toolshed_core::Settings)

pub mod vault;

pub use vault::TestVault;
