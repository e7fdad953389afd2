//! Vault sandbox
//!
//! Every path a client hands us is resolved against the vault root before any
//! I/O happens. Resolution canonicalizes the existing part of the path (so
//! symlinks and `..` are followed to their real target) and only then checks
//! ancestry, component by component. Raw string prefixes are never compared:
//! `/vault2/note.md` is not inside `/vault`.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use tracing::warn;

use crate::{Error, NormalizedPath, Result};

/// Canonical root directory that confines all note access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultRoot {
    root: PathBuf,
}

impl VaultRoot {
    /// Canonicalize `path` and use it as the sandbox root.
    ///
    /// # Errors
    ///
    /// Fails if the path does not exist or is not a directory.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let root = dunce::canonicalize(path).map_err(|e| Error::io(path, e))?;
        if !root.is_dir() {
            return Err(Error::NotADirectory { path: root });
        }
        Ok(Self { root })
    }

    /// The canonical root path.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve a vault-relative (or absolute) path and require that it stays
    /// inside the root.
    ///
    /// The target does not need to exist; components that do exist are
    /// canonicalized, the rest are applied lexically.
    pub fn resolve(&self, candidate: impl AsRef<Path>) -> Result<PathBuf> {
        let candidate = candidate.as_ref();
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };

        let resolved = resolve_components(&joined).map_err(|e| Error::io(&joined, e))?;

        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            warn!(path = %candidate.display(), root = %self.root.display(), "Access denied: path not in vault");
            Err(Error::PathOutsideRoot {
                path: candidate.to_path_buf(),
                root: self.root.clone(),
            })
        }
    }

    /// True if `candidate` resolves to the root or one of its descendants.
    pub fn contains(&self, candidate: impl AsRef<Path>) -> bool {
        self.resolve(candidate).is_ok()
    }

    /// Express an already-resolved path relative to the root.
    pub fn relative(&self, resolved: &Path) -> Option<NormalizedPath> {
        resolved
            .strip_prefix(&self.root)
            .ok()
            .map(NormalizedPath::new)
    }
}

/// Walk `path` one component at a time, canonicalizing every prefix that
/// exists on disk. Once a component is missing, later components cannot be
/// symlinks, so they are joined lexically (with `..` popping).
fn resolve_components(path: &Path) -> std::io::Result<PathBuf> {
    let mut current = PathBuf::new();
    let mut pending: Vec<OsString> = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => current.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if pending.pop().is_none() {
                    current.pop();
                }
            }
            Component::Normal(name) => {
                if !pending.is_empty() {
                    pending.push(name.to_os_string());
                    continue;
                }
                let next = current.join(name);
                match std::fs::symlink_metadata(&next) {
                    Ok(_) => current = dunce::canonicalize(&next)?,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        pending.push(name.to_os_string());
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }

    for name in pending {
        current.push(name);
    }
    Ok(current)
}
