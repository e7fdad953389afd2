//! Command implementations for toolshed-cli

pub mod mcp;
pub mod models;
pub mod rotation;
pub mod route;

use std::future::Future;
use std::path::PathBuf;

use toolshed_core::{Settings, SettingsLoader};

use crate::error::Result;

pub use mcp::run_mcp;
pub use models::run_models;
pub use rotation::run_rotation;
pub use route::{run_classify, run_exec, run_route};

/// Load settings, honouring `--config`.
pub fn load_settings(config: Option<PathBuf>) -> Result<Settings> {
    let settings = SettingsLoader::new().with_explicit(config).load()?;
    tracing::debug!(source = ?settings.source, "Settings loaded");
    Ok(settings)
}

/// Drive an async command to completion on a fresh runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

/// Join positional words back into the task text.
pub(crate) fn task_text(words: &[String]) -> Result<String> {
    let task = words.join(" ");
    if task.trim().is_empty() {
        return Err(crate::error::CliError::user("Task description is empty"));
    }
    Ok(task)
}
