//! Path normalization for watch targets.
//!
//! Every path entering the registry goes through [`PathResolver`] so that
//! `~/data`, `/home/user/data/` and a symlink pointing at the same folder all
//! produce one canonical key.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use super::error::{RegistryError, RegistryResult};

/// Resolves raw user input into canonical directory paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    home: Option<PathBuf>,
}

impl PathResolver {
    /// Create a resolver expanding `~` to `home`.
    pub fn new(home: Option<PathBuf>) -> Self {
        Self { home }
    }

    /// Trim surrounding whitespace and expand a leading `~` component.
    ///
    /// Returns `None` when the path starts with `~` but no home directory is
    /// known. `~user` forms are left untouched.
    pub fn expand_home(&self, raw: &Path) -> Option<PathBuf> {
        let trimmed = match raw.to_str() {
            Some(s) => Path::new(s.trim()),
            None => raw,
        };

        match trimmed.strip_prefix("~") {
            Ok(rest) => {
                let home = self.home.as_ref()?;
                if rest.as_os_str().is_empty() {
                    Some(home.clone())
                } else {
                    Some(home.join(rest))
                }
            }
            Err(_) => Some(trimmed.to_path_buf()),
        }
    }

    /// Resolve `raw` to the canonical path of an existing, readable directory.
    ///
    /// This is the add-time validation: symlinks are resolved, the target
    /// must be a directory and must be listable. The canonical form must be
    /// valid UTF-8 since entries are stored and reported as text.
    pub fn canonical_dir(&self, raw: &Path) -> RegistryResult<PathBuf> {
        let expanded = self
            .expand_home(raw)
            .ok_or_else(|| RegistryError::NotADirectory {
                path: raw.to_path_buf(),
            })?;

        if expanded.as_os_str().is_empty() {
            return Err(RegistryError::NotADirectory { path: expanded });
        }

        let canonical = fs::canonicalize(&expanded).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => RegistryError::PermissionDenied {
                path: expanded.clone(),
            },
            _ => RegistryError::NotADirectory {
                path: expanded.clone(),
            },
        })?;

        if !canonical.is_dir() {
            return Err(RegistryError::NotADirectory { path: canonical });
        }
        if canonical.to_str().is_none() {
            return Err(RegistryError::InvalidPath { path: canonical });
        }

        match fs::read_dir(&canonical) {
            Ok(_) => Ok(canonical),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Err(RegistryError::PermissionDenied { path: canonical })
            }
            Err(_) => Err(RegistryError::NotADirectory { path: canonical }),
        }
    }

    /// Resolve `raw` for lookups without requiring the target to exist.
    ///
    /// Uses full canonicalization when the path exists. Otherwise the longest
    /// existing ancestor is canonicalized and the remainder appended, which
    /// keeps entries whose directory was deleted after being added removable.
    pub fn resolve_lenient(&self, raw: &Path) -> PathBuf {
        let expanded = self
            .expand_home(raw)
            .unwrap_or_else(|| raw.to_path_buf());

        match fs::canonicalize(&expanded) {
            Ok(canonical) => canonical,
            Err(_) => canonicalize_existing_prefix(&expanded),
        }
    }
}

/// Make `path` absolute and fold `.`/`..` components without touching the
/// filesystem. Trailing separators disappear in the process.
pub fn normalize_lexical(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn canonicalize_existing_prefix(path: &Path) -> PathBuf {
    let lexical = normalize_lexical(path);

    for ancestor in lexical.ancestors() {
        let Ok(base) = fs::canonicalize(ancestor) else {
            continue;
        };
        if let Ok(rest) = lexical.strip_prefix(ancestor) {
            return if rest.as_os_str().is_empty() {
                base
            } else {
                base.join(rest)
            };
        }
    }

    lexical
}
