//! Credential rotation for toolshed
//!
//! - [`audit`]: the append-only JSONL log every attempt is recorded in
//! - [`policy`]: per-service rotation periods and persisted overrides
//! - [`rotator`]: the [`CredentialRotator`] trait and the rotate workflow
//! - [`scheduler`]: decides which registered rotators are due
//! - [`secrets`]: the 1Password CLI behind [`SecretStore`]
//! - [`guides`] and [`report`]: markdown for humans
//!
//! Secrets are never written to the audit log; successful rotations record
//! a short fingerprint of the new credential instead.

pub mod audit;
pub mod error;
pub mod guides;
pub mod manager;
pub mod notify;
pub mod policy;
pub mod report;
pub mod rotator;
pub mod scheduler;
pub mod secrets;
mod subprocess;

pub use audit::{AuditEntry, AuditLog, AuditStatus, ServiceStatus, needs_rotation};
pub use error::{Result, RotationError};
pub use guides::{ManualGuide, manual_guide, render_checklist};
pub use manager::{CredentialCheck, RotateResponse, RotationManager};
pub use notify::{DesktopNotifier, NoopNotifier, Notifier};
pub use policy::{PolicyOverride, PolicyStore, RotationPolicy};
pub use report::{render_history_report, render_status_report};
pub use rotator::{CommandRotator, CredentialRotator, RotationOutcome, rotate};
pub use scheduler::{CycleReport, RotationScheduler};
pub use secrets::{MemorySecretStore, OnePasswordCli, SecretStore};
