//! Everything a tool call needs, built once at startup

use toolshed_core::Settings;
use toolshed_rotation::RotationManager;
use toolshed_router::Router;

use crate::vault::Vault;
use crate::{Error, Result};

pub struct ServerContext {
    settings: Settings,
    /// `None` when the configured vault directory is missing; vault tools
    /// then fail while rotation and router tools keep working.
    vault: Option<Vault>,
    rotation: RotationManager,
    router: Router,
}

impl ServerContext {
    /// Build the production context: 1Password-backed rotation and real
    /// provider clients.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let rotation = RotationManager::from_settings(&settings.rotation);
        let router = Router::from_settings(&settings.router)?;
        Ok(Self::new(settings, rotation, router))
    }

    pub fn new(settings: Settings, rotation: RotationManager, router: Router) -> Self {
        let vault = match Vault::open(&settings.vault) {
            Ok(vault) => {
                tracing::info!(root = %vault.root().path().display(), "Vault opened");
                Some(vault)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Vault tools disabled");
                None
            }
        };
        Self {
            settings,
            vault,
            rotation,
            router,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn vault(&self) -> Result<&Vault> {
        match &self.vault {
            Some(vault) => Ok(vault),
            None => Err(Error::VaultUnavailable {
                path: self.settings.vault.resolved_root()?,
            }),
        }
    }

    pub fn rotation(&self) -> &RotationManager {
        &self.rotation
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}
