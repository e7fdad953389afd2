//! Markdown reports for status and history

use chrono::{DateTime, Local};

use crate::audit::{AuditEntry, AuditStatus, ServiceStatus};

pub fn render_status_report(statuses: &[ServiceStatus], now: DateTime<Local>) -> String {
    let mut out = String::from("# Credential Rotation Status\n\n");
    out.push_str(&format!(
        "**Report Generated**: {}\n\n",
        now.format("%Y-%m-%d %H:%M:%S")
    ));

    for status in statuses {
        out.push_str(&format!("## {}\n", status.service));
        out.push_str(&format!("- **1Password Item**: `{}`\n", status.op_item));
        out.push_str(&format!(
            "- **Rotation Policy**: Every {} days ({})\n",
            status.policy_days,
            if status.automated { "automated" } else { "manual" }
        ));

        match (status.last_rotation, status.days_since) {
            (Some(last), Some(days)) => {
                out.push_str(&format!(
                    "- **Last Rotation**: {} ({} days ago)\n",
                    last.format("%Y-%m-%d"),
                    days
                ));
                out.push_str(&format!(
                    "- **Next Rotation Due**: {} days\n",
                    status.days_until_rotation
                ));
            }
            _ => out.push_str("- **Last Rotation**: Never\n"),
        }

        let label = if status.needs_rotation {
            "⚠️ Needs Rotation"
        } else {
            "✅ Up to date"
        };
        out.push_str(&format!("- **Status**: {label}\n\n"));
    }

    out
}

/// History entries are expected newest first.
pub fn render_history_report(entries: &[AuditEntry], service: Option<&str>) -> String {
    if entries.is_empty() {
        return "No rotation history found.".to_string();
    }

    let mut out = String::from("# Rotation History\n\n");
    if let Some(service) = service {
        out.push_str(&format!("**Service**: {service}\n\n"));
    }

    for entry in entries {
        let mark = match entry.status {
            AuditStatus::Success => "✅",
            AuditStatus::Failed => "❌",
            AuditStatus::Skipped => "⏭️",
        };
        out.push_str(&format!("## {mark} {}\n", entry.service));
        out.push_str(&format!("- **Timestamp**: {}\n", entry.timestamp.to_rfc3339()));
        out.push_str(&format!("- **Status**: {}\n", entry.status));
        if !entry.details.is_empty() {
            out.push_str(&format!("- **Details**: {}\n", entry.details));
        }
        out.push('\n');
    }

    out
}
