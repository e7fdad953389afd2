//! Settings discovery and environment overrides

use std::path::PathBuf;

use toolshed_fs::{ConfigStore, NormalizedPath};

use super::settings::Settings;
use crate::{Error, Result};

const FILE_NAME: &str = "toolshed.toml";

/// Locates and loads `toolshed.toml`, then applies environment overrides.
pub struct SettingsLoader {
    /// Path given on the command line; must exist when set
    explicit: Option<PathBuf>,

    /// Directory searched for `./toolshed.toml`
    working_dir: PathBuf,

    /// Override for the user config directory (used for testing).
    /// When `None`, `dirs::config_dir()` is used.
    config_dir_override: Option<PathBuf>,
}

impl SettingsLoader {
    pub fn new() -> Self {
        Self {
            explicit: None,
            working_dir: PathBuf::from("."),
            config_dir_override: None,
        }
    }

    /// Use this file instead of searching.
    pub fn with_explicit(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir_override = Some(dir.into());
        self
    }

    fn user_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.config_dir_override {
            return Some(dir.clone());
        }
        dirs::config_dir().map(|d| d.join("toolshed"))
    }

    /// Load settings using the process environment.
    pub fn load(&self) -> Result<Settings> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Load settings, reading environment variables through `env`.
    pub fn load_with_env(&self, env: impl Fn(&str) -> Option<String>) -> Result<Settings> {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let mut settings = match self.locate(&env)? {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading settings");
                let mut settings: Settings =
                    ConfigStore::new().load(&NormalizedPath::new(&path))?;
                settings.source = Some(path);
                settings
            }
            None => {
                tracing::debug!("No toolshed.toml found, using defaults");
                Settings::default()
            }
        };

        apply_env_overrides(&mut settings, &env);
        settings.validate()?;
        Ok(settings)
    }

    fn locate(&self, env: &impl Fn(&str) -> Option<String>) -> Result<Option<PathBuf>> {
        if let Some(ref path) = self.explicit {
            if !path.is_file() {
                return Err(Error::ConfigNotFound { path: path.clone() });
            }
            return Ok(Some(path.clone()));
        }

        if let Some(path) = env("TOOLSHED_CONFIG").map(PathBuf::from) {
            if !path.is_file() {
                return Err(Error::ConfigNotFound { path });
            }
            return Ok(Some(path));
        }

        let local = self.working_dir.join(FILE_NAME);
        if local.is_file() {
            return Ok(Some(local));
        }

        Ok(self
            .user_config_dir()
            .map(|dir| dir.join(FILE_NAME))
            .filter(|path| path.is_file()))
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_env_overrides(settings: &mut Settings, env: &impl Fn(&str) -> Option<String>) {
    if let Some(root) = env("VAULT_PATH") {
        settings.vault.root = Some(PathBuf::from(root));
    }
    if let Some(url) = env("OLLAMA_BASE_URL") {
        settings.router.ollama_base_url = url;
    }
    if let Some(dir) = env("TOOLSHED_STATE_DIR") {
        settings.rotation.state_dir = Some(PathBuf::from(dir));
    }

    let keys = &mut settings.router.keys;
    keys.openai = env("OPENAI_API_KEY");
    keys.anthropic = env("ANTHROPIC_API_KEY");
    keys.gemini = env("GEMINI_API_KEY").or_else(|| env("GOOGLE_API_KEY"));
}
