//! Append-only rotation audit log
//!
//! One JSON object per line: `{timestamp, service, status, details}`.
//! Entries are only ever appended; readers see them in insertion order.
//! Lines that fail to parse are skipped so a single bad write cannot hide
//! the rest of the history.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use toolshed_fs::{RobustnessConfig, io};

use crate::Result;
use crate::policy::RotationPolicy;

/// Outcome recorded for a rotation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Success,
    Failed,
    Skipped,
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// A single audit log line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Local>,
    pub service: String,
    pub status: AuditStatus,
    #[serde(default)]
    pub details: String,
}

impl AuditEntry {
    pub fn new(
        timestamp: DateTime<Local>,
        service: impl Into<String>,
        status: AuditStatus,
        details: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            service: service.into(),
            status,
            details: details.into(),
        }
    }
}

/// RFC 3339 timestamps; naive ISO-8601 values from older logs are read as
/// local time.
mod timestamp {
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &DateTime<Local>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Local>, D::Error> {
        let raw = String::deserialize(d)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Local));
        }
        let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map_err(|e| D::Error::custom(format!("invalid timestamp `{raw}`: {e}")))?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| D::Error::custom(format!("nonexistent local time `{raw}`")))
    }
}

/// True when a credential is due: never rotated, or the last successful
/// rotation is strictly more than `policy_days` days before `now`.
pub fn needs_rotation(
    last: Option<DateTime<Local>>,
    policy_days: u32,
    now: DateTime<Local>,
) -> bool {
    match last {
        None => true,
        Some(last) => now - last > Duration::days(i64::from(policy_days)),
    }
}

/// Rotation state of one service at a point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub service: String,
    pub op_item: String,
    pub last_rotation: Option<DateTime<Local>>,
    pub days_since: Option<i64>,
    pub needs_rotation: bool,
    pub policy_days: u32,
    /// Days left before the policy expires; zero when never rotated
    pub days_until_rotation: i64,
    pub automated: bool,
}

impl ServiceStatus {
    pub fn compute(
        policy: &RotationPolicy,
        last_rotation: Option<DateTime<Local>>,
        now: DateTime<Local>,
    ) -> Self {
        let days_since = last_rotation.map(|last| (now - last).num_days());
        Self {
            service: policy.service.clone(),
            op_item: policy.op_item.clone(),
            last_rotation,
            days_since,
            needs_rotation: needs_rotation(last_rotation, policy.policy_days, now),
            policy_days: policy.policy_days,
            days_until_rotation: days_since
                .map(|since| i64::from(policy.policy_days) - since)
                .unwrap_or(0),
            automated: policy.automated,
        }
    }
}

/// JSONL audit log on disk
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
    robustness: RobustnessConfig,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            robustness: RobustnessConfig::default(),
        }
    }

    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an entry stamped with the current local time.
    pub fn record(
        &self,
        service: &str,
        status: AuditStatus,
        details: impl Into<String>,
    ) -> Result<AuditEntry> {
        let entry = AuditEntry::new(Local::now(), service, status, details);
        self.append(&entry)?;
        Ok(entry)
    }

    pub fn append(&self, entry: &AuditEntry) -> Result<()> {
        let line = serde_json::to_string(entry)?;
        io::append_line(&self.path, &line, self.robustness)?;
        tracing::debug!(
            service = %entry.service,
            status = %entry.status,
            "Recorded audit entry"
        );
        Ok(())
    }

    /// Every parseable entry, oldest first.
    pub fn entries(&self) -> Result<Vec<AuditEntry>> {
        let lines = io::read_lines(&self.path, self.robustness)?;
        let mut entries = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping malformed audit entry"
                ),
            }
        }
        Ok(entries)
    }

    /// The last `limit` entries (optionally for one service), newest first.
    pub fn history(&self, service: Option<&str>, limit: usize) -> Result<Vec<AuditEntry>> {
        let mut matching: Vec<AuditEntry> = self
            .entries()?
            .into_iter()
            .filter(|e| service.is_none_or(|s| e.service == s))
            .collect();
        let skip = matching.len().saturating_sub(limit);
        matching.drain(..skip);
        matching.reverse();
        Ok(matching)
    }

    /// Timestamp of the latest successful rotation.
    pub fn last_rotation(&self, service: &str) -> Result<Option<DateTime<Local>>> {
        Ok(self.last_successes()?.remove(service))
    }

    pub fn needs_rotation(&self, service: &str, policy_days: u32, now: DateTime<Local>) -> Result<bool> {
        Ok(needs_rotation(self.last_rotation(service)?, policy_days, now))
    }

    pub fn status(&self, policy: &RotationPolicy, now: DateTime<Local>) -> Result<ServiceStatus> {
        Ok(ServiceStatus::compute(
            policy,
            self.last_rotation(&policy.service)?,
            now,
        ))
    }

    /// Status of several services from a single read of the log.
    pub fn statuses(
        &self,
        policies: &[RotationPolicy],
        now: DateTime<Local>,
    ) -> Result<Vec<ServiceStatus>> {
        let last = self.last_successes()?;
        Ok(policies
            .iter()
            .map(|p| ServiceStatus::compute(p, last.get(&p.service).copied(), now))
            .collect())
    }

    fn last_successes(&self) -> Result<HashMap<String, DateTime<Local>>> {
        let mut last = HashMap::new();
        for entry in self.entries()? {
            if entry.status == AuditStatus::Success {
                // Later lines win, matching insertion order.
                last.insert(entry.service, entry.timestamp);
            }
        }
        Ok(last)
    }
}
