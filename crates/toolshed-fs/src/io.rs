//! Lock-protected I/O operations
//!
//! Appends and atomic writes take an advisory lock via `fs2`. Lock attempts
//! are non-blocking and retried with exponential backoff until
//! [`RobustnessConfig::lock_timeout`] elapses.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use backoff::ExponentialBackoff;
use fs2::FileExt;
use tracing::debug;

use crate::{Error, NormalizedPath, Result};

/// Default upper bound for reads of user content (10 MiB).
pub const MAX_READ_BYTES: u64 = 10 * 1024 * 1024;

/// Tuning knobs for locking and durability.
#[derive(Debug, Clone, Copy)]
pub struct RobustnessConfig {
    /// How long to keep retrying a contended lock before giving up.
    pub lock_timeout: Duration,
    /// Whether to fsync after writing.
    pub enable_fsync: bool,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            enable_fsync: true,
        }
    }
}

#[derive(Clone, Copy)]
enum LockKind {
    Shared,
    Exclusive,
}

fn lock_with_retry(file: &File, path: &Path, kind: LockKind, config: RobustnessConfig) -> Result<()> {
    let policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(10),
        max_interval: Duration::from_millis(250),
        max_elapsed_time: Some(config.lock_timeout),
        ..ExponentialBackoff::default()
    };

    backoff::retry(policy, || {
        let attempt = match kind {
            LockKind::Shared => FileExt::try_lock_shared(file),
            LockKind::Exclusive => FileExt::try_lock_exclusive(file),
        };
        attempt.map_err(|e| {
            debug!(path = %path.display(), error = %e, "Lock contended, retrying");
            backoff::Error::transient(e)
        })
    })
    .map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })
}

/// Append a single line to a file, creating it (and its parents) if needed.
///
/// The newline is added here; `line` must not contain one.
pub fn append_line(path: &Path, line: &str, config: RobustnessConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::io(path, e))?;

    lock_with_retry(&file, path, LockKind::Exclusive, config)?;

    let mut buf = String::with_capacity(line.len() + 1);
    buf.push_str(line);
    buf.push('\n');
    file.write_all(buf.as_bytes())
        .map_err(|e| Error::io(path, e))?;

    if config.enable_fsync {
        file.sync_data().map_err(|e| Error::io(path, e))?;
    }

    // Lock released when file is dropped
    Ok(())
}

/// Read every line of a file under a shared lock.
///
/// A missing file yields an empty list. Lines are decoded one at a time;
/// invalid UTF-8 in one line is replaced and does not fail the read.
pub fn read_lines(path: &Path, config: RobustnessConfig) -> Result<Vec<String>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::io(path, e)),
    };

    lock_with_retry(&file, path, LockKind::Shared, config)?;

    // Read through the locked handle to avoid TOCTOU race
    let mut content = Vec::new();
    (&file)
        .read_to_end(&mut content)
        .map_err(|e| Error::io(path, e))?;

    let mut lines: Vec<String> = content
        .split(|b| *b == b'\n')
        .enumerate()
        .map(|(index, raw)| {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            match std::str::from_utf8(raw) {
                Ok(line) => line.to_string(),
                Err(_) => {
                    debug!(path = %path.display(), line = index + 1, "Invalid UTF-8 in line");
                    String::from_utf8_lossy(raw).into_owned()
                }
            }
        })
        .collect();

    // `split` yields an empty tail after the final newline
    if content.is_empty() || content.ends_with(b"\n") {
        lines.pop();
    }
    Ok(lines)
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so readers never observe a partial file.
/// Writing through a symlinked parent directory is refused.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], config: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        reject_symlinked_ancestors(parent)?;
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let result = (|| {
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| Error::io(&temp_path, e))?;

        lock_with_retry(&temp_file, &native_path, LockKind::Exclusive, config)?;

        temp_file
            .write_all(content)
            .map_err(|e| Error::io(&temp_path, e))?;

        if config.enable_fsync {
            temp_file
                .sync_all()
                .map_err(|e| Error::io(&temp_path, e))?;
        }

        fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read a text file, refusing anything larger than `limit` bytes.
pub fn read_text_bounded(path: &Path, limit: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
    if metadata.len() > limit {
        return Err(Error::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit,
        });
    }
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

fn reject_symlinked_ancestors(dir: &Path) -> Result<()> {
    for ancestor in dir.ancestors() {
        let is_symlink = fs::symlink_metadata(ancestor)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);
        if !is_symlink {
            continue;
        }
        // System-level links such as /var -> /private/var on macOS sit
        // directly under the filesystem root and are allowed.
        if ancestor.parent().is_some_and(|p| p.parent().is_none()) {
            continue;
        }
        return Err(Error::SymlinkInPath {
            path: ancestor.to_path_buf(),
        });
    }
    Ok(())
}
