//! Settings model and layered loading
//!
//! Settings come from a single `toolshed.toml`, picked from the first
//! existing candidate:
//!
//! 1. An explicit `--config <path>` (must exist)
//! 2. `$TOOLSHED_CONFIG`
//! 3. `./toolshed.toml`
//! 4. `<config_dir>/toolshed/toolshed.toml`
//!
//! A missing file means defaults. Environment overrides are applied last.
//! Provider API keys are only ever read from the environment.

mod loader;
mod settings;

pub use loader::SettingsLoader;
pub use settings::{
    HookCommands, ProviderKeys, RotationSettings, RouterSettings, ServiceConfig, Settings,
    VaultSettings,
};
