//! Policy-driven rotation of registered rotators

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::audit::{AuditLog, AuditStatus, ServiceStatus};
use crate::notify::Notifier;
use crate::policy::RotationPolicy;
use crate::rotator::{CredentialRotator, RotationOutcome, rotate};
use crate::secrets::SecretStore;
use crate::{Result, RotationError};

/// Summary of one scheduled run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    /// Automated services that were attempted, keyed by name
    pub results: BTreeMap<String, bool>,
    /// Manual services past their policy
    pub manual_due: Vec<ServiceStatus>,
}

impl CycleReport {
    pub fn succeeded(&self) -> usize {
        self.results.values().filter(|ok| **ok).count()
    }

    pub fn failed(&self) -> usize {
        self.results.values().filter(|ok| !**ok).count()
    }
}

/// Holds registered rotators and decides which are due
pub struct RotationScheduler {
    audit: AuditLog,
    store: Arc<dyn SecretStore>,
    vault: String,
    rotators: Vec<Box<dyn CredentialRotator>>,
}

impl RotationScheduler {
    pub fn new(audit: AuditLog, store: Arc<dyn SecretStore>, vault: impl Into<String>) -> Self {
        Self {
            audit,
            store,
            vault: vault.into(),
            rotators: Vec::new(),
        }
    }

    pub fn register(&mut self, rotator: Box<dyn CredentialRotator>) {
        tracing::debug!(service = rotator.service_name(), "Registered rotator");
        self.rotators.push(rotator);
    }

    pub fn service_names(&self) -> Vec<&str> {
        self.rotators.iter().map(|r| r.service_name()).collect()
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Rotate every registered service that is due, or all when `force`.
    pub fn check_and_rotate(&self, force: bool) -> Result<BTreeMap<String, bool>> {
        self.check_and_rotate_at(force, Local::now())
    }

    pub fn check_and_rotate_at(
        &self,
        force: bool,
        now: DateTime<Local>,
    ) -> Result<BTreeMap<String, bool>> {
        let mut results = BTreeMap::new();

        for rotator in &self.rotators {
            let service = rotator.service_name();
            let last = self.audit.last_rotation(service)?;
            let due = force || crate::audit::needs_rotation(last, rotator.rotation_days(), now);

            if due {
                tracing::info!(service, "Rotating");
                let outcome = rotate(rotator.as_ref(), self.store.as_ref(), &self.audit, &self.vault);
                results.insert(service.to_string(), outcome.succeeded());
            } else {
                let days_since = last.map(|l| (now - l).num_days());
                tracing::info!(service, days_since, "Skipping, not due");
            }
        }

        Ok(results)
    }

    /// Rotate a single registered service.
    ///
    /// Without `force`, a service that is not yet due is skipped and nothing
    /// is written to the audit log.
    pub fn rotate_service(
        &self,
        service: &str,
        force: bool,
        now: DateTime<Local>,
    ) -> Result<RotationOutcome> {
        let rotator = self
            .rotators
            .iter()
            .find(|r| r.service_name() == service)
            .ok_or_else(|| RotationError::NoRotator(service.to_string()))?;

        if !force {
            let last = self.audit.last_rotation(service)?;
            if !crate::audit::needs_rotation(last, rotator.rotation_days(), now) {
                let days = last.map(|l| (now - l).num_days()).unwrap_or_default();
                return Ok(RotationOutcome {
                    service: service.to_string(),
                    status: AuditStatus::Skipped,
                    message: format!(
                        "Not due: last rotated {days} days ago (policy {} days). Use force to rotate anyway.",
                        rotator.rotation_days()
                    ),
                });
            }
        }

        Ok(rotate(rotator.as_ref(), self.store.as_ref(), &self.audit, &self.vault))
    }

    /// Status of every registered rotator.
    pub fn status(&self, now: DateTime<Local>) -> Result<Vec<ServiceStatus>> {
        let policies: Vec<RotationPolicy> = self
            .rotators
            .iter()
            .map(|r| RotationPolicy {
                service: r.service_name().to_string(),
                op_item: r.op_item().to_string(),
                field: r.field().to_string(),
                policy_days: r.rotation_days(),
                automated: true,
                hooks: None,
            })
            .collect();
        self.audit.statuses(&policies, now)
    }

    /// Manual services whose policy has expired.
    pub fn manual_due(
        &self,
        policies: &[RotationPolicy],
        now: DateTime<Local>,
    ) -> Result<Vec<ServiceStatus>> {
        let manual: Vec<RotationPolicy> = policies.iter().filter(|p| !p.automated).cloned().collect();
        Ok(self
            .audit
            .statuses(&manual, now)?
            .into_iter()
            .filter(|s| s.needs_rotation)
            .collect())
    }

    /// Rotate what is due, list manual work, and notify about both.
    pub fn run_cycle(
        &self,
        policies: &[RotationPolicy],
        notifier: &dyn Notifier,
        force: bool,
        now: DateTime<Local>,
    ) -> Result<CycleReport> {
        let report = CycleReport {
            results: self.check_and_rotate_at(force, now)?,
            manual_due: self.manual_due(policies, now)?,
        };

        if report.succeeded() > 0 {
            notifier.notify(
                "Credential Rotation",
                &format!("Rotated {} credential(s)", report.succeeded()),
            );
        }
        if report.failed() > 0 {
            notifier.notify(
                "Credential Rotation Failed",
                &format!("{} rotation(s) failed - check logs", report.failed()),
            );
        }
        if !report.manual_due.is_empty() {
            let names: Vec<&str> = report.manual_due.iter().map(|s| s.service.as_str()).collect();
            notifier.notify("Manual Credential Rotation Needed", &names.join(", "));
        }

        tracing::info!(
            rotated = report.succeeded(),
            failed = report.failed(),
            manual_due = report.manual_due.len(),
            "Rotation cycle complete"
        );
        Ok(report)
    }
}
