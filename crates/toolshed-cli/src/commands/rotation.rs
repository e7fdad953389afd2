//! `rotation` subcommands

use chrono::Local;
use colored::Colorize;
use toolshed_core::Settings;
use toolshed_rotation::{CredentialCheck, RotateResponse, RotationManager, ServiceStatus};

use crate::cli::RotationAction;
use crate::error::Result;

pub fn run_rotation(settings: &Settings, action: RotationAction) -> Result<()> {
    let manager = RotationManager::from_settings(&settings.rotation);
    tracing::debug!(state_dir = %settings.rotation.resolved_state_dir().display(), "Rotation state");

    match action {
        RotationAction::Status { json } => status(&manager, json),
        RotationAction::Check { force } => check(&manager, force),
        RotationAction::Rotate { service, force } => rotate(&manager, &service, force),
        RotationAction::History { service, limit } => {
            println!("{}", manager.history_report(service.as_deref(), limit)?);
            Ok(())
        }
        RotationAction::Guide { service } => {
            println!("{}", manager.guide(&service));
            Ok(())
        }
        RotationAction::Record { service, details } => {
            let entry = manager.record_manual(&service, details.as_deref())?;
            println!(
                "{} Recorded manual rotation of {}",
                "✓".green(),
                entry.service.cyan()
            );
            Ok(())
        }
        RotationAction::Test { service } => test(&manager, &service),
        RotationAction::Schedule {
            service,
            days,
            disable,
        } => {
            let update = manager.schedule(&service, days, !disable)?;
            println!("{} Rotation schedule updated for {}", "✓".green(), service.cyan());
            println!("  Frequency: every {} days", update.rotation_days);
            println!(
                "  Status: {}",
                if update.enabled { "enabled".green() } else { "disabled".yellow() }
            );
            Ok(())
        }
    }
}

fn status(manager: &RotationManager, json: bool) -> Result<()> {
    let statuses = manager.status(Local::now())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    println!("{}", "Credential Rotation Status".bold());
    println!();
    for status in &statuses {
        print_status(status);
    }

    let due = statuses.iter().filter(|s| s.needs_rotation).count();
    println!();
    if due == 0 {
        println!("{}", "All credentials are up to date.".green());
    } else {
        println!("{}", format!("{due} credential(s) need rotation.").yellow());
    }
    Ok(())
}

fn print_status(status: &ServiceStatus) {
    let marker = if status.needs_rotation {
        "!".yellow().bold()
    } else {
        "✓".green()
    };
    let last = match (status.last_rotation, status.days_since) {
        (Some(at), Some(days)) => format!("last {} ({days}d ago)", at.format("%Y-%m-%d")),
        _ => "never rotated".to_string(),
    };
    let mode = if status.automated { "automated" } else { "manual" };
    println!(
        "  {} {:<24} {} {}",
        marker,
        status.service.cyan(),
        last,
        format!("every {}d, {mode}", status.policy_days).dimmed()
    );
}

fn check(manager: &RotationManager, force: bool) -> Result<()> {
    let report = manager.run_cycle(force, Local::now())?;

    if report.results.is_empty() {
        println!("{}", "No automated rotations were due.".dimmed());
    }
    for (service, ok) in &report.results {
        if *ok {
            println!("  {} {}", "✓".green(), service);
        } else {
            println!("  {} {}", "✗".red(), service);
        }
    }

    if !report.manual_due.is_empty() {
        println!();
        println!("{}", "Manual rotation required:".yellow().bold());
        for status in &report.manual_due {
            println!(
                "  {} (run `toolshed rotation guide \"{}\"`)",
                status.service.cyan(),
                status.service
            );
        }
    }

    println!();
    println!(
        "{} succeeded, {} failed, {} manual",
        report.succeeded(),
        report.failed(),
        report.manual_due.len()
    );
    Ok(())
}

fn test(manager: &RotationManager, service: &str) -> Result<()> {
    match manager.test_credential(service)? {
        CredentialCheck::Passed => println!("{} {service} credential test passed", "✓".green()),
        CredentialCheck::Failed => println!("{} {service} credential test failed", "✗".red()),
        CredentialCheck::Unavailable => println!(
            "{} Automated testing not available for {service}",
            "!".yellow()
        ),
    }
    Ok(())
}

fn rotate(manager: &RotationManager, service: &str, force: bool) -> Result<()> {
    match manager.rotate(service, force, Local::now())? {
        RotateResponse::Automated(outcome) if outcome.succeeded() => {
            println!("{} Rotated {}", "✓".green(), outcome.service.cyan())
        }
        RotateResponse::Automated(outcome) => {
            println!("{} {}: {}", "✗".red(), outcome.service, outcome.message)
        }
        RotateResponse::Manual { checklist, .. } => println!("{checklist}"),
    }
    Ok(())
}
