//! Desktop notifications for scheduled runs

use crate::subprocess::run_program;

/// Delivers short user-facing messages
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// macOS Notification Center via `osascript`; a log line elsewhere
#[derive(Debug, Default, Clone, Copy)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        if !cfg!(target_os = "macos") {
            tracing::info!(title, message, "Notification");
            return;
        }

        let script = format!(
            "display notification \"{}\" with title \"{}\"",
            escape_applescript(message),
            escape_applescript(title)
        );
        if let Err(e) = run_program("osascript", &["-e", &script], "osascript") {
            tracing::warn!(error = %e, "Failed to send notification");
        }
    }
}

/// Discards every notification
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _title: &str, _message: &str) {}
}

fn escape_applescript(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(escape_applescript(r#"say "hi" \o/"#), r#"say \"hi\" \\o/"#);
    }
}
