//! Effective rotation policies
//!
//! Policies start from `[[rotation.services]]` in settings. Overrides written
//! by `schedule_rotation` live in a separate file under the state directory
//! so settings files are never rewritten by the tool.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use toolshed_core::{HookCommands, ServiceConfig};
use toolshed_fs::{ConfigStore, NormalizedPath};

use crate::{Result, RotationError};

/// Rotation policy for one service after overrides are applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationPolicy {
    pub service: String,
    pub op_item: String,
    pub field: String,
    pub policy_days: u32,
    pub automated: bool,
    #[serde(skip)]
    pub hooks: Option<HookCommands>,
}

impl RotationPolicy {
    pub fn manual(service: &str, op_item: &str, policy_days: u32) -> Self {
        Self {
            service: service.to_string(),
            op_item: op_item.to_string(),
            field: "credential".to_string(),
            policy_days,
            automated: false,
            hooks: None,
        }
    }
}

impl From<&ServiceConfig> for RotationPolicy {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            service: config.name.clone(),
            op_item: config.op_item.clone(),
            field: config.field.clone(),
            policy_days: config.policy_days,
            automated: config.automated,
            hooks: config.hooks.clone(),
        }
    }
}

/// A persisted schedule change for one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOverride {
    pub rotation_days: u32,
    /// Whether automated rotation is allowed
    pub enabled: bool,
    pub last_updated: DateTime<Local>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PolicyFile {
    #[serde(default)]
    services: BTreeMap<String, PolicyOverride>,
}

/// Reads and writes the policy override file
pub struct PolicyStore {
    path: PathBuf,
    store: ConfigStore,
}

impl PolicyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            store: ConfigStore::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn overrides(&self) -> Result<BTreeMap<String, PolicyOverride>> {
        let file: PolicyFile = self.store.load_or_default(&NormalizedPath::new(&self.path))?;
        Ok(file.services)
    }

    /// Persist a new schedule for `service`.
    pub fn set(&self, service: &str, rotation_days: u32, enabled: bool) -> Result<PolicyOverride> {
        if rotation_days == 0 {
            return Err(RotationError::InvalidPolicy(
                "rotation_days must be at least 1".into(),
            ));
        }
        if service.trim().is_empty() {
            return Err(RotationError::InvalidPolicy("service name is empty".into()));
        }

        let normalized = NormalizedPath::new(&self.path);
        let mut file: PolicyFile = self.store.load_or_default(&normalized)?;
        let entry = PolicyOverride {
            rotation_days,
            enabled,
            last_updated: Local::now(),
        };
        file.services.insert(service.to_string(), entry.clone());
        self.store.save(&normalized, &file)?;

        tracing::info!(service, rotation_days, enabled, "Updated rotation schedule");
        Ok(entry)
    }

    /// Configured services with overrides applied.
    ///
    /// A disabled override turns automation off. Enabling automation only
    /// takes effect for services with hook commands. Overrides for services
    /// absent from settings add them as manual services.
    pub fn effective(&self, services: &[ServiceConfig]) -> Result<Vec<RotationPolicy>> {
        let overrides = self.overrides()?;
        let mut policies: Vec<RotationPolicy> = services.iter().map(RotationPolicy::from).collect();

        for policy in &mut policies {
            if let Some(o) = overrides.get(&policy.service) {
                policy.policy_days = o.rotation_days;
                policy.automated = o.enabled && policy.hooks.is_some();
            }
        }

        for (service, o) in &overrides {
            if policies.iter().any(|p| &p.service == service) {
                continue;
            }
            policies.push(RotationPolicy::manual(service, service, o.rotation_days));
        }

        Ok(policies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use toolshed_core::ServiceConfig;

    fn automated(name: &str) -> ServiceConfig {
        let mut svc = ServiceConfig::manual(name, name, "credential", 90);
        svc.automated = true;
        svc.hooks = Some(HookCommands {
            generate: "echo new".into(),
            revoke: None,
            test: None,
        });
        svc
    }

    #[test]
    fn no_file_means_settings_as_is() {
        let temp = TempDir::new().unwrap();
        let store = PolicyStore::new(temp.path().join("rotation_policies.toml"));
        let policies = store.effective(&ServiceConfig::defaults()).unwrap();
        assert_eq!(policies.len(), 7);
        assert!(policies.iter().all(|p| !p.automated));
    }

    #[test]
    fn override_changes_days_and_automation() {
        let temp = TempDir::new().unwrap();
        let store = PolicyStore::new(temp.path().join("state/rotation_policies.toml"));
        let services = vec![automated("Cloudflare"), ServiceConfig::manual("Gamma API", "Gamma API", "credential", 90)];

        store.set("Cloudflare", 30, false).unwrap();
        store.set("Gamma API", 45, true).unwrap();

        let policies = store.effective(&services).unwrap();
        assert_eq!(policies[0].policy_days, 30);
        assert!(!policies[0].automated);
        assert_eq!(policies[1].policy_days, 45);
        assert!(!policies[1].automated, "no hooks, stays manual");
    }

    #[test]
    fn override_for_unknown_service_adds_manual_policy() {
        let temp = TempDir::new().unwrap();
        let store = PolicyStore::new(temp.path().join("rotation_policies.toml"));
        store.set("GitHub PAT", 60, true).unwrap();

        let policies = store.effective(&[]).unwrap();
        assert_eq!(policies, vec![RotationPolicy::manual("GitHub PAT", "GitHub PAT", 60)]);
    }

    #[test]
    fn zero_days_is_rejected() {
        let temp = TempDir::new().unwrap();
        let store = PolicyStore::new(temp.path().join("rotation_policies.toml"));
        assert!(matches!(
            store.set("Cloudflare", 0, true),
            Err(RotationError::InvalidPolicy(_))
        ));
        assert!(!store.path().exists());
    }

    #[test]
    fn overrides_survive_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("rotation_policies.toml");
        PolicyStore::new(&path).set("TMDB API", 120, true).unwrap();

        let reloaded = PolicyStore::new(&path).overrides().unwrap();
        assert_eq!(reloaded["TMDB API"].rotation_days, 120);
        assert!(reloaded["TMDB API"].enabled);
    }
}
