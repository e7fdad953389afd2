//! Credential rotators and the rotation workflow

use serde::Serialize;
use toolshed_core::HookCommands;
use toolshed_fs::checksum::fingerprint;

use crate::audit::{AuditLog, AuditStatus};
use crate::policy::RotationPolicy;
use crate::secrets::SecretStore;
use crate::subprocess::run_shell;
use crate::{Result, RotationError};

/// A service whose credential can be replaced without a human
pub trait CredentialRotator: Send + Sync {
    fn service_name(&self) -> &str;

    /// 1Password item holding the credential
    fn op_item(&self) -> &str;

    /// Field within the item
    fn field(&self) -> &str {
        "credential"
    }

    fn rotation_days(&self) -> u32 {
        90
    }

    /// Issue a new credential with the provider.
    fn generate_new_credential(&self) -> Result<String>;

    /// Invalidate the previous credential with the provider.
    fn revoke_old_credential(&self, old_credential: &str) -> Result<()>;

    /// Whether [`test_credential`](Self::test_credential) actually probes
    /// the provider.
    fn supports_testing(&self) -> bool {
        false
    }

    fn test_credential(&self, _credential: &str) -> bool {
        true
    }
}

/// Result of one rotation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationOutcome {
    pub service: String,
    pub status: AuditStatus,
    pub message: String,
}

impl RotationOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == AuditStatus::Success
    }
}

/// Run the full rotation for one service.
///
/// Steps: read current, generate, store, test (rolling back on failure),
/// revoke old, record. Revocation failures are logged but do not fail the
/// rotation. Every outcome except a skip lands in the audit log.
pub fn rotate(
    rotator: &dyn CredentialRotator,
    store: &dyn SecretStore,
    audit: &AuditLog,
    vault: &str,
) -> RotationOutcome {
    let service = rotator.service_name().to_string();
    tracing::info!(service = %service, "Starting rotation");

    let (status, message) = match run_steps(rotator, store, vault) {
        Ok(message) => {
            tracing::info!(service = %service, "Rotation completed successfully");
            (AuditStatus::Success, message)
        }
        Err(message) => {
            tracing::error!(service = %service, error = %message, "Rotation failed");
            (AuditStatus::Failed, message)
        }
    };

    if let Err(e) = audit.record(&service, status, &message) {
        tracing::error!(service = %service, error = %e, "Failed to write audit entry");
    }

    RotationOutcome {
        service,
        status,
        message,
    }
}

fn run_steps(
    rotator: &dyn CredentialRotator,
    store: &dyn SecretStore,
    vault: &str,
) -> std::result::Result<String, String> {
    let item = rotator.op_item();
    let field = rotator.field();
    let reference = format!("op://{vault}/{item}/{field}");

    let current = store.read(&reference).map_err(|e| e.to_string())?;

    let new_credential = rotator
        .generate_new_credential()
        .map_err(|e| format!("Generation failed: {e}"))?;
    if new_credential.is_empty() {
        return Err("Generation failed: empty credential".to_string());
    }

    store
        .update(item, field, &new_credential)
        .map_err(|e| format!("Failed to update 1Password: {e}"))?;

    if !rotator.test_credential(&new_credential) {
        return match store.update(item, field, &current) {
            Ok(()) => Err("New credential test failed, rolled back".to_string()),
            Err(e) => Err(format!(
                "New credential test failed and rollback failed: {e}"
            )),
        };
    }

    if let Err(e) = rotator.revoke_old_credential(&current) {
        tracing::warn!(
            service = rotator.service_name(),
            error = %e,
            "Failed to revoke old credential"
        );
    }

    Ok(format!(
        "Rotated successfully (new credential {})",
        fingerprint(&new_credential)
    ))
}

/// Rotator driven by shell commands from `[rotation.services.hooks]`
#[derive(Debug, Clone)]
pub struct CommandRotator {
    service: String,
    op_item: String,
    field: String,
    rotation_days: u32,
    hooks: HookCommands,
}

impl CommandRotator {
    pub fn new(policy: &RotationPolicy, hooks: HookCommands) -> Self {
        Self {
            service: policy.service.clone(),
            op_item: policy.op_item.clone(),
            field: policy.field.clone(),
            rotation_days: policy.policy_days,
            hooks,
        }
    }

    /// Build a rotator for a policy that has hooks configured.
    pub fn from_policy(policy: &RotationPolicy) -> Option<Self> {
        policy.hooks.clone().map(|hooks| Self::new(policy, hooks))
    }
}

impl CredentialRotator for CommandRotator {
    fn service_name(&self) -> &str {
        &self.service
    }

    fn op_item(&self) -> &str {
        &self.op_item
    }

    fn field(&self) -> &str {
        &self.field
    }

    fn rotation_days(&self) -> u32 {
        self.rotation_days
    }

    fn generate_new_credential(&self) -> Result<String> {
        let out = run_shell(&self.hooks.generate, &[])?;
        let credential = out.lines().last().unwrap_or("").trim().to_string();
        if credential.is_empty() {
            return Err(RotationError::Generation(
                "generate hook printed nothing".into(),
            ));
        }
        Ok(credential)
    }

    fn revoke_old_credential(&self, old_credential: &str) -> Result<()> {
        match &self.hooks.revoke {
            Some(cmd) => run_shell(cmd, &[("TOOLSHED_OLD_CREDENTIAL", old_credential)]).map(|_| ()),
            None => Err(RotationError::Generation(format!(
                "no revoke hook configured; revoke the old {} credential manually",
                self.service
            ))),
        }
    }

    fn supports_testing(&self) -> bool {
        self.hooks.test.is_some()
    }

    fn test_credential(&self, credential: &str) -> bool {
        let Some(cmd) = &self.hooks.test else {
            return true;
        };
        match run_shell(cmd, &[("TOOLSHED_CREDENTIAL", credential)]) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(service = %self.service, error = %e, "Credential test failed");
                false
            }
        }
    }
}
