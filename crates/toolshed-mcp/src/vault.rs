//! Read-only view of the Obsidian vault
//!
//! Every path a client sends goes through [`VaultRoot::resolve`] before it
//! touches the filesystem, so `..`, absolute paths and symlinks that leave
//! the vault are all rejected the same way.

use std::fs::Metadata;
use std::path::Path;

use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::Serialize;
use toolshed_core::VaultSettings;
use toolshed_fs::io::{MAX_READ_BYTES, read_text_bounded};
use toolshed_fs::{NormalizedPath, VaultRoot};
use walkdir::WalkDir;

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A note and its file metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteContent {
    pub path: String,
    pub content: String,
    pub size: u64,
    pub modified: DateTime<Local>,
    /// Not every filesystem records a creation time
    pub created: Option<DateTime<Local>>,
}

/// The daily note for one date, which may not exist yet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyNote {
    pub date: String,
    pub path: String,
    pub content: Option<String>,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One entry of a recent-notes listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteSummary {
    pub path: String,
    pub name: String,
    pub modified: DateTime<Local>,
    pub size: u64,
}

/// A directory under the projects folder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub name: String,
    pub path: String,
    pub notes: usize,
    pub last_modified: Option<DateTime<Local>>,
}

pub struct Vault {
    root: VaultRoot,
    settings: VaultSettings,
}

impl Vault {
    /// Open the vault named by `settings`.
    pub fn open(settings: &VaultSettings) -> Result<Self> {
        let path = settings.resolved_root()?;
        let root = VaultRoot::new(&path).map_err(|e| {
            tracing::debug!(path = %path.display(), error = %e, "Vault root rejected");
            Error::VaultUnavailable { path: path.clone() }
        })?;
        Ok(Self::with_root(root, settings.clone()))
    }

    pub fn with_root(root: VaultRoot, settings: VaultSettings) -> Self {
        Self { root, settings }
    }

    pub fn root(&self) -> &VaultRoot {
        &self.root
    }

    /// Read a markdown note by vault-relative path.
    pub fn note_content(&self, path: &str) -> Result<NoteContent> {
        let resolved = self.root.resolve(path)?;
        if !resolved.is_file() {
            return Err(Error::NoteNotFound(path.to_string()));
        }
        let display = self.display_path(&resolved, path);
        if !NormalizedPath::new(&resolved).is_markdown() {
            return Err(Error::NotMarkdown(display));
        }

        let content = read_text_bounded(&resolved, MAX_READ_BYTES)?;
        let meta = metadata(&resolved)?;
        Ok(NoteContent {
            path: display,
            content,
            size: meta.len(),
            modified: modified_at(&resolved, &meta)?,
            created: meta.created().ok().map(DateTime::<Local>::from),
        })
    }

    /// Daily note for `date` (`YYYY-MM-DD`), or for `today` when absent.
    pub fn daily_note(&self, date: Option<&str>, today: NaiveDate) -> Result<DailyNote> {
        let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map_err(|_| Error::InvalidDate(raw.to_string()))?,
            None => today,
        };
        let date = date.format(DATE_FORMAT).to_string();
        let relative = format!("{}/{}.md", self.settings.daily_folder, date);
        let resolved = self.root.resolve(&relative)?;
        let path = self.display_path(&resolved, &relative);

        if resolved.is_file() {
            Ok(DailyNote {
                date,
                path,
                content: Some(read_text_bounded(&resolved, MAX_READ_BYTES)?),
                exists: true,
                message: None,
            })
        } else {
            Ok(DailyNote {
                date,
                path,
                content: None,
                exists: false,
                message: Some("Daily note does not exist yet".to_string()),
            })
        }
    }

    /// Markdown notes under `folder` modified within `days` of `now`,
    /// newest first, at most `limit` of them.
    pub fn recent_notes(
        &self,
        days: u32,
        folder: &str,
        limit: usize,
        now: DateTime<Local>,
    ) -> Result<Vec<NoteSummary>> {
        let search = if folder.trim().is_empty() {
            self.root.path().to_path_buf()
        } else {
            self.root.resolve(folder)?
        };
        if !search.is_dir() {
            tracing::debug!(folder, "Folder does not exist, no recent notes");
            return Ok(Vec::new());
        }

        // A window reaching past chrono's range means "no cutoff"
        let cutoff = now.checked_sub_signed(Duration::days(i64::from(days)));
        let mut notes = Vec::new();
        for path in self.markdown_files(&search) {
            let meta = match metadata(&path) {
                Ok(meta) => meta,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable note");
                    continue;
                }
            };
            let modified = modified_at(&path, &meta)?;
            if cutoff.is_some_and(|cutoff| modified < cutoff) {
                continue;
            }
            notes.push(NoteSummary {
                path: self.display_path(&path, &path.to_string_lossy()),
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                modified,
                size: meta.len(),
            });
        }

        notes.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
        notes.truncate(limit);

        tracing::info!(count = notes.len(), days, limit, "Listed recent notes");
        Ok(notes)
    }

    /// Subdirectories of the projects folder with their note counts.
    pub fn projects(&self) -> Result<Vec<ProjectSummary>> {
        let folder = self.root.resolve(&self.settings.projects_folder)?;
        if !folder.is_dir() {
            return Ok(Vec::new());
        }

        let mut dirs: Vec<_> = std::fs::read_dir(&folder)
            .map_err(|e| toolshed_fs::Error::io(&folder, e))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .filter(|entry| !self.settings.is_excluded(&entry.file_name().to_string_lossy()))
            .collect();
        dirs.sort_by_key(|entry| entry.file_name());

        let mut projects = Vec::with_capacity(dirs.len());
        for entry in dirs {
            let dir = entry.path();
            let mut notes = 0;
            let mut last_modified: Option<DateTime<Local>> = None;
            for note in self.markdown_files(&dir) {
                notes += 1;
                if let Ok(meta) = metadata(&note) {
                    let modified = modified_at(&note, &meta)?;
                    last_modified = last_modified.max(Some(modified));
                }
            }
            projects.push(ProjectSummary {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: self.display_path(&dir, &dir.to_string_lossy()),
                notes,
                last_modified,
            });
        }
        Ok(projects)
    }

    /// Regular `.md` files below `dir`, skipping excluded directories.
    /// Symlinks are not followed.
    fn markdown_files(&self, dir: &Path) -> Vec<std::path::PathBuf> {
        WalkDir::new(dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !(entry.file_type().is_dir()
                        && self.settings.is_excluded(&entry.file_name().to_string_lossy()))
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable vault entry");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| NormalizedPath::new(path).is_markdown())
            .collect()
    }

    fn display_path(&self, resolved: &Path, fallback: &str) -> String {
        self.root
            .relative(resolved)
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| NormalizedPath::new(fallback).as_str().to_string())
    }
}

fn metadata(path: &Path) -> Result<Metadata> {
    std::fs::metadata(path).map_err(|e| toolshed_fs::Error::io(path, e).into())
}

fn modified_at(path: &Path, meta: &Metadata) -> Result<DateTime<Local>> {
    meta.modified()
        .map(DateTime::<Local>::from)
        .map_err(|e| toolshed_fs::Error::io(path, e).into())
}
