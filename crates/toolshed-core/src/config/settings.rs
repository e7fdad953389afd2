//! Settings sections parsed from `toolshed.toml`

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

fn default_daily_folder() -> String {
    "Daily Notes".to_string()
}

fn default_projects_folder() -> String {
    "Projects".to_string()
}

fn default_excluded_dirs() -> Vec<String> {
    [
        "venv",
        "node_modules",
        ".git",
        "__pycache__",
        ".venv",
        "env",
        ".env",
        "dist",
        "build",
        ".next",
        ".cache",
        "site-packages",
        ".obsidian",
        ".trash",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_classifier_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_category() -> String {
    "default_general".to_string()
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_openai_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_audit_file() -> String {
    "audit.jsonl".to_string()
}

fn default_policy_file() -> String {
    "rotation_policies.toml".to_string()
}

fn default_op_vault() -> String {
    "API_Keys".to_string()
}

fn default_true() -> bool {
    true
}

fn default_field() -> String {
    "credential".to_string()
}

fn default_policy_days() -> u32 {
    90
}

/// Complete toolshed settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub vault: VaultSettings,

    #[serde(default)]
    pub router: RouterSettings,

    #[serde(default)]
    pub rotation: RotationSettings,

    /// File the settings were loaded from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Settings {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.router.request_timeout_secs == 0 {
            return Err(Error::InvalidSetting {
                key: "router.request_timeout_secs".into(),
                reason: "must be at least 1".into(),
            });
        }

        let mut seen = HashSet::new();
        for service in &self.rotation.services {
            if !seen.insert(service.name.as_str()) {
                return Err(Error::InvalidSetting {
                    key: "rotation.services".into(),
                    reason: format!("duplicate service `{}`", service.name),
                });
            }
            if service.policy_days == 0 {
                return Err(Error::InvalidSetting {
                    key: format!("rotation.services.{}.policy_days", service.name),
                    reason: "must be at least 1".into(),
                });
            }
            if service.automated && service.hooks.is_none() {
                return Err(Error::InvalidSetting {
                    key: format!("rotation.services.{}.automated", service.name),
                    reason: "automated rotation needs a [hooks] table with a generate command"
                        .into(),
                });
            }
        }
        Ok(())
    }
}

/// `[vault]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultSettings {
    /// Vault directory. Falls back to `~/Documents/ObsidianVault`.
    #[serde(default)]
    pub root: Option<PathBuf>,

    #[serde(default = "default_daily_folder")]
    pub daily_folder: String,

    #[serde(default = "default_projects_folder")]
    pub projects_folder: String,

    /// Directory names skipped when walking the vault
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            root: None,
            daily_folder: default_daily_folder(),
            projects_folder: default_projects_folder(),
            excluded_dirs: default_excluded_dirs(),
        }
    }
}

impl VaultSettings {
    /// The configured vault root, or the conventional location under `$HOME`.
    pub fn resolved_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        dirs::home_dir()
            .map(|home| home.join("Documents").join("ObsidianVault"))
            .ok_or(Error::VaultNotConfigured)
    }

    pub fn is_excluded(&self, dir_name: &str) -> bool {
        self.excluded_dirs.iter().any(|d| d == dir_name)
    }
}

/// `[router]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterSettings {
    #[serde(default = "default_ollama_base_url")]
    pub ollama_base_url: String,

    /// Model used to classify tasks
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,

    /// Category used when classification fails
    #[serde(default = "default_category")]
    pub default_category: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_anthropic_base_url")]
    pub anthropic_base_url: String,

    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Provider keys, populated from the environment only
    #[serde(skip)]
    pub keys: ProviderKeys,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            ollama_base_url: default_ollama_base_url(),
            classifier_model: default_classifier_model(),
            default_category: default_category(),
            request_timeout_secs: default_request_timeout_secs(),
            openai_base_url: default_openai_base_url(),
            anthropic_base_url: default_anthropic_base_url(),
            gemini_base_url: default_gemini_base_url(),
            keys: ProviderKeys::default(),
        }
    }
}

/// API keys for commercial providers
#[derive(Clone, Default)]
pub struct ProviderKeys {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub gemini: Option<String>,
}

impl fmt::Debug for ProviderKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(key: &Option<String>) -> &'static str {
            if key.is_some() { "<set>" } else { "<unset>" }
        }
        f.debug_struct("ProviderKeys")
            .field("openai", &redact(&self.openai))
            .field("anthropic", &redact(&self.anthropic))
            .field("gemini", &redact(&self.gemini))
            .finish()
    }
}

/// `[rotation]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationSettings {
    /// Directory holding the audit log and policy overrides.
    /// Falls back to `<data_dir>/toolshed`.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,

    #[serde(default = "default_audit_file")]
    pub audit_file: String,

    #[serde(default = "default_policy_file")]
    pub policy_file: String,

    /// 1Password vault holding the credentials
    #[serde(default = "default_op_vault")]
    pub vault: String,

    /// Send desktop notifications after scheduled runs
    #[serde(default = "default_true")]
    pub notify: bool,

    #[serde(default = "ServiceConfig::defaults")]
    pub services: Vec<ServiceConfig>,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            state_dir: None,
            audit_file: default_audit_file(),
            policy_file: default_policy_file(),
            vault: default_op_vault(),
            notify: true,
            services: ServiceConfig::defaults(),
        }
    }
}

impl RotationSettings {
    pub fn resolved_state_dir(&self) -> PathBuf {
        match &self.state_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .map(|d| d.join("toolshed"))
                .unwrap_or_else(|| PathBuf::from(".toolshed")),
        }
    }

    pub fn audit_path(&self) -> PathBuf {
        self.resolved_state_dir().join(&self.audit_file)
    }

    pub fn policy_path(&self) -> PathBuf {
        self.resolved_state_dir().join(&self.policy_file)
    }

    /// Look up a service by exact name.
    pub fn service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services.iter().find(|s| s.name == name)
    }
}

/// One `[[rotation.services]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,

    /// 1Password item title
    pub op_item: String,

    /// Field within the item holding the secret
    #[serde(default = "default_field")]
    pub field: String,

    #[serde(default = "default_policy_days")]
    pub policy_days: u32,

    #[serde(default)]
    pub automated: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<HookCommands>,
}

impl ServiceConfig {
    pub fn manual(name: &str, op_item: &str, field: &str, policy_days: u32) -> Self {
        Self {
            name: name.to_string(),
            op_item: op_item.to_string(),
            field: field.to_string(),
            policy_days,
            automated: false,
            hooks: None,
        }
    }

    /// The credentials tracked out of the box.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::manual("Perplexity Pro", "Perplexity Pro API", "credential", 90),
            Self::manual("Gamma API", "Gamma API", "credential", 90),
            Self::manual("Airtable", "Airtable WalterSignal", "api_key", 90),
            Self::manual(
                "Google OAuth - MCP",
                "Google OAuth - Gmail MCP Server",
                "client_secret",
                180,
            ),
            Self::manual(
                "Google OAuth - Parser",
                "Google OAuth - Gmail Amazon Parser",
                "client_secret",
                180,
            ),
            Self::manual("Cloudflare", "Cloudflare Wrangler OAuth", "oauth_token", 90),
            Self::manual("TMDB API", "TMDB API - Alfred Workflow", "api_key", 180),
        ]
    }

    /// `op://<vault>/<item>/<field>` reference for this credential.
    pub fn secret_reference(&self, vault: &str) -> String {
        format!("op://{}/{}/{}", vault, self.op_item, self.field)
    }
}

/// Shell commands driving an automated rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookCommands {
    /// Prints the new credential on stdout
    pub generate: String,

    /// Receives the old credential in `TOOLSHED_OLD_CREDENTIAL`
    #[serde(default)]
    pub revoke: Option<String>,

    /// Receives the candidate in `TOOLSHED_CREDENTIAL`; exit 0 means it works
    #[serde(default)]
    pub test: Option<String>,
}
