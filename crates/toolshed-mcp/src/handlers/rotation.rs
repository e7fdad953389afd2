// ============================================================================
// Rotation Handlers
// ============================================================================

use chrono::Local;
use serde::Deserialize;
use serde_json::{Value, json};
use toolshed_rotation::{CredentialCheck, RotateResponse};

use super::{non_empty, parse_args};
use crate::context::ServerContext;
use crate::{Error, Result};

#[derive(Deserialize)]
struct ServiceArgs {
    service: String,
}

#[derive(Deserialize)]
struct HistoryArgs {
    #[serde(default)]
    service: Option<String>,
    #[serde(default = "default_history_limit")]
    limit: usize,
}

#[derive(Deserialize)]
struct RotateArgs {
    service: String,
    #[serde(default)]
    force: bool,
}

#[derive(Deserialize)]
struct RecordArgs {
    service: String,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Deserialize)]
struct ScheduleArgs {
    service: String,
    rotation_days: u32,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_history_limit() -> usize {
    10
}

fn default_enabled() -> bool {
    true
}

/// Handle check_rotation_status - Markdown status report
pub(super) fn check_rotation_status(ctx: &ServerContext) -> Result<Value> {
    let report = ctx.rotation().status_report(Local::now())?;
    Ok(Value::String(report))
}

/// Handle get_rotation_history - Markdown history report
pub(super) fn get_rotation_history(ctx: &ServerContext, arguments: Value) -> Result<Value> {
    let args: HistoryArgs = parse_args(arguments)?;
    let service = args.service.as_deref().filter(|s| !s.trim().is_empty());
    let report = ctx.rotation().history_report(service, args.limit)?;
    Ok(Value::String(report))
}

/// Handle get_manual_rotation_guide - Checklist for one service
pub(super) fn get_manual_rotation_guide(ctx: &ServerContext, arguments: Value) -> Result<Value> {
    let args: ServiceArgs = parse_args(arguments)?;
    let service = non_empty("service", args.service)?;
    Ok(Value::String(ctx.rotation().guide(&service)))
}

/// Handle rotate_credential - Automated rotation or the manual checklist
pub(super) fn rotate_credential(ctx: &ServerContext, arguments: Value) -> Result<Value> {
    let args: RotateArgs = parse_args(arguments)?;
    let service = non_empty("service", args.service)?;

    let text = match ctx.rotation().rotate(&service, args.force, Local::now())? {
        RotateResponse::Automated(outcome) if outcome.succeeded() => format!(
            "✅ Successfully rotated {}!\n\nThe new credential has been stored in 1Password.",
            outcome.service
        ),
        RotateResponse::Automated(outcome) => {
            format!("❌ Rotation of {} did not complete: {}", outcome.service, outcome.message)
        }
        RotateResponse::Manual { service, checklist } => {
            format!("{service} requires manual rotation.\n\n{checklist}")
        }
    };
    Ok(Value::String(text))
}

/// Handle record_manual_rotation - Log a rotation done by hand
pub(super) fn record_manual_rotation(ctx: &ServerContext, arguments: Value) -> Result<Value> {
    let args: RecordArgs = parse_args(arguments)?;
    let service = non_empty("service", args.service)?;
    let entry = ctx
        .rotation()
        .record_manual(&service, args.details.as_deref())?;
    Ok(json!({
        "recorded": true,
        "entry": entry,
    }))
}

/// Handle test_credential - Run the service's test hook
pub(super) fn test_credential(ctx: &ServerContext, arguments: Value) -> Result<Value> {
    let args: ServiceArgs = parse_args(arguments)?;
    let service = non_empty("service", args.service)?;
    let policy = ctx.rotation().policy(&service)?;

    let text = match ctx.rotation().test_credential(&policy.service)? {
        CredentialCheck::Passed => format!("✅ {} credential test passed", policy.service),
        CredentialCheck::Failed => format!("❌ {} credential test failed", policy.service),
        CredentialCheck::Unavailable => {
            format!("⚠️  Automated testing not available for {}", policy.service)
        }
    };
    Ok(Value::String(text))
}

/// Handle schedule_rotation - Change a service's rotation period
pub(super) fn schedule_rotation(ctx: &ServerContext, arguments: Value) -> Result<Value> {
    let args: ScheduleArgs = parse_args(arguments)?;
    let service = non_empty("service", args.service)?;
    if args.rotation_days == 0 {
        return Err(Error::InvalidArguments(
            "`rotation_days` must be at least 1".to_string(),
        ));
    }

    let updated = ctx
        .rotation()
        .schedule(&service, args.rotation_days, args.enabled)?;
    let status = if updated.enabled { "Enabled" } else { "Disabled" };
    Ok(Value::String(format!(
        "✅ Rotation schedule updated for {service}:\n- Frequency: Every {} days\n- Status: {status}",
        updated.rotation_days
    )))
}
