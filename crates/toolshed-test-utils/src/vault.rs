//! [`TestVault`] builder for vault, rotation and server test scenarios.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::TempDir;
use toolshed_core::Settings;

const DAY: Duration = Duration::from_secs(86_400);

/// A temporary directory holding `vault/` and `state/` side by side.
///
/// # Example
///
/// ```rust,no_run
/// use toolshed_test_utils::TestVault;
///
/// let vault = TestVault::new();
/// vault
///     .note("Projects/Alpha/README.md", "# Alpha")
///     .note_aged("Archive/old.md", "stale", 30);
/// vault.assert_file_exists("Projects/Alpha/README.md");
/// let settings = vault.settings();
/// ```
pub struct TestVault {
    temp_dir: TempDir,
}

impl Default for TestVault {
    fn default() -> Self {
        Self::new()
    }
}

impl TestVault {
    /// Create an empty vault and state directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("vault")).unwrap();
        fs::create_dir_all(temp_dir.path().join("state")).unwrap();
        Self { temp_dir }
    }

    /// The vault root.
    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("vault")
    }

    /// Where the audit log and policy overrides go.
    pub fn state_dir(&self) -> PathBuf {
        self.temp_dir.path().join("state")
    }

    /// Settings pointing at this vault and state directory, with
    /// notifications off.
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        settings.vault.root = Some(self.root());
        settings.rotation.state_dir = Some(self.state_dir());
        settings.rotation.notify = false;
        settings
    }

    /// Write `content` to `path` (relative to the vault), creating parents.
    pub fn note(&self, path: &str, content: &str) -> &Self {
        let full = self.root().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full, content).unwrap();
        self
    }

    /// Write a note whose modification time is `days_old` days in the past.
    pub fn note_aged(&self, path: &str, content: &str, days_old: u32) -> &Self {
        self.note(path, content);
        self.set_age(path, DAY * days_old);
        self
    }

    /// Write `Daily Notes/<date>.md`.
    pub fn daily_note(&self, date: &str, content: &str) -> &Self {
        self.note(&format!("Daily Notes/{date}.md"), content)
    }

    /// Create an empty directory inside the vault.
    pub fn dir(&self, path: &str) -> &Self {
        fs::create_dir_all(self.root().join(path)).unwrap();
        self
    }

    /// Backdate the modification time of an existing file.
    pub fn set_age(&self, path: &str, age: Duration) {
        let full = self.root().join(path);
        let mtime = SystemTime::now() - age;
        File::options()
            .write(true)
            .open(&full)
            .and_then(|f| f.set_modified(mtime))
            .unwrap_or_else(|e| panic!("Could not set mtime on {}: {e}", full.display()));
    }

    /// Assert that `path` (relative to the vault) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` inside the state directory contains
    /// `content`.
    pub fn assert_state_contains(&self, path: &str, content: &str) {
        let full_path = self.state_dir().join(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }

    /// The path of the temp directory itself, for tests that need a location
    /// outside the vault.
    pub fn outside(&self) -> &Path {
        self.temp_dir.path()
    }
}
