//! Entry point used by the CLI and the MCP server
//!
//! `RotationManager` ties settings, policy overrides, the audit log, the
//! secret store and notifications together so front ends only translate
//! arguments and render results.

use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use toolshed_core::RotationSettings;

use crate::audit::{AuditEntry, AuditLog, AuditStatus, ServiceStatus};
use crate::guides::{manual_guide, render_checklist};
use crate::notify::{DesktopNotifier, NoopNotifier, Notifier};
use crate::policy::{PolicyOverride, PolicyStore, RotationPolicy};
use crate::report::{render_history_report, render_status_report};
use crate::rotator::{CommandRotator, CredentialRotator, RotationOutcome};
use crate::scheduler::{CycleReport, RotationScheduler};
use crate::secrets::{OnePasswordCli, SecretStore};
use crate::{Result, RotationError};

/// What `rotate` did for a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RotateResponse {
    Automated(RotationOutcome),
    /// The service has no rotator; follow the checklist by hand
    Manual { service: String, checklist: String },
}

/// Result of probing the stored credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialCheck {
    Passed,
    Failed,
    Unavailable,
}

pub struct RotationManager {
    settings: RotationSettings,
    audit: AuditLog,
    policies: PolicyStore,
    store: Arc<dyn SecretStore>,
    notifier: Arc<dyn Notifier>,
}

impl RotationManager {
    /// Manager backed by the 1Password CLI and desktop notifications.
    pub fn from_settings(settings: &RotationSettings) -> Self {
        let notifier: Arc<dyn Notifier> = if settings.notify {
            Arc::new(DesktopNotifier)
        } else {
            Arc::new(NoopNotifier)
        };
        Self {
            audit: AuditLog::new(settings.audit_path()),
            policies: PolicyStore::new(settings.policy_path()),
            store: Arc::new(OnePasswordCli::new(settings.vault.clone())),
            notifier,
            settings: settings.clone(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SecretStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Effective policies, settings first, then services added by overrides.
    pub fn policies(&self) -> Result<Vec<RotationPolicy>> {
        self.policies.effective(&self.settings.services)
    }

    /// Find a policy by exact name, then case-insensitively, then by a
    /// unique prefix.
    pub fn policy(&self, service: &str) -> Result<RotationPolicy> {
        let policies = self.policies()?;
        let wanted = service.trim().to_lowercase();

        if let Some(p) = policies.iter().find(|p| p.service == service) {
            return Ok(p.clone());
        }
        if let Some(p) = policies.iter().find(|p| p.service.to_lowercase() == wanted) {
            return Ok(p.clone());
        }
        let mut prefixed = policies
            .iter()
            .filter(|p| !wanted.is_empty() && p.service.to_lowercase().starts_with(&wanted));
        match (prefixed.next(), prefixed.next()) {
            (Some(p), None) => Ok(p.clone()),
            _ => Err(RotationError::UnknownService(service.to_string())),
        }
    }

    /// Scheduler with a [`CommandRotator`] for every automated policy.
    pub fn scheduler(&self, policies: &[RotationPolicy]) -> RotationScheduler {
        let mut scheduler =
            RotationScheduler::new(self.audit.clone(), Arc::clone(&self.store), &self.settings.vault);
        for policy in policies.iter().filter(|p| p.automated) {
            if let Some(rotator) = CommandRotator::from_policy(policy) {
                scheduler.register(Box::new(rotator));
            }
        }
        scheduler
    }

    pub fn status(&self, now: DateTime<Local>) -> Result<Vec<ServiceStatus>> {
        self.audit.statuses(&self.policies()?, now)
    }

    pub fn status_report(&self, now: DateTime<Local>) -> Result<String> {
        Ok(render_status_report(&self.status(now)?, now))
    }

    pub fn history(&self, service: Option<&str>, limit: usize) -> Result<Vec<AuditEntry>> {
        self.audit.history(service, limit)
    }

    pub fn history_report(&self, service: Option<&str>, limit: usize) -> Result<String> {
        Ok(render_history_report(&self.history(service, limit)?, service))
    }

    pub fn guide(&self, service: &str) -> String {
        render_checklist(service)
    }

    /// Rotate one service: automated services go through the scheduler,
    /// everything else gets the manual checklist.
    pub fn rotate(&self, service: &str, force: bool, now: DateTime<Local>) -> Result<RotateResponse> {
        let policy = match self.policy(service) {
            Ok(policy) => policy,
            Err(RotationError::UnknownService(_)) if manual_guide(service).is_some() => {
                return Ok(RotateResponse::Manual {
                    service: service.to_string(),
                    checklist: render_checklist(service),
                });
            }
            Err(e) => return Err(e),
        };

        if !policy.automated {
            return Ok(RotateResponse::Manual {
                checklist: render_checklist(&policy.service),
                service: policy.service,
            });
        }

        let scheduler = self.scheduler(std::slice::from_ref(&policy));
        scheduler
            .rotate_service(&policy.service, force, now)
            .map(RotateResponse::Automated)
    }

    /// Record a rotation done by hand.
    pub fn record_manual(&self, service: &str, details: Option<&str>) -> Result<AuditEntry> {
        let service = match self.policy(service) {
            Ok(policy) => policy.service,
            Err(RotationError::UnknownService(_)) if !service.trim().is_empty() => {
                service.trim().to_string()
            }
            Err(e) => return Err(e),
        };
        let details = details
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("Manual rotation completed");
        self.audit.record(&service, AuditStatus::Success, details)
    }

    /// Run the service's test hook against the stored credential.
    pub fn test_credential(&self, service: &str) -> Result<CredentialCheck> {
        let policy = self.policy(service)?;
        let Some(rotator) = CommandRotator::from_policy(&policy) else {
            return Ok(CredentialCheck::Unavailable);
        };
        if !rotator.supports_testing() {
            return Ok(CredentialCheck::Unavailable);
        }

        let reference = format!("op://{}/{}/{}", self.settings.vault, policy.op_item, policy.field);
        let credential = self.store.read(&reference)?;
        Ok(if rotator.test_credential(&credential) {
            CredentialCheck::Passed
        } else {
            CredentialCheck::Failed
        })
    }

    pub fn schedule(&self, service: &str, rotation_days: u32, enabled: bool) -> Result<PolicyOverride> {
        let name = self
            .policy(service)
            .map(|p| p.service)
            .unwrap_or_else(|_| service.trim().to_string());
        self.policies.set(&name, rotation_days, enabled)
    }

    /// One scheduled pass over every policy.
    pub fn run_cycle(&self, force: bool, now: DateTime<Local>) -> Result<CycleReport> {
        let policies = self.policies()?;
        self.scheduler(&policies)
            .run_cycle(&policies, self.notifier.as_ref(), force, now)
    }
}
