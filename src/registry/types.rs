//! Value types handed out by the registry.

use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A canonical watched folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WatchedPath(PathBuf);

impl WatchedPath {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Whether the folder still exists as a directory.
    pub fn exists(&self) -> bool {
        self.0.is_dir()
    }
}

impl AsRef<Path> for WatchedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for WatchedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Immutable, insertion-ordered view of the registry.
///
/// Cloning is cheap and a snapshot never changes after it was taken.
#[derive(Debug, Clone, Default)]
pub struct WatchSnapshot {
    entries: Arc<[WatchedPath]>,
}

impl WatchSnapshot {
    pub(crate) fn new(entries: Vec<WatchedPath>) -> Self {
        Self {
            entries: entries.into(),
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path() == path)
    }

    /// Paths rendered as strings, for display layers.
    ///
    /// Lossless: entries are UTF-8, enforced when they are added and by the
    /// TOML store they are loaded from.
    pub fn to_strings(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.to_string()).collect()
    }
}

impl Deref for WatchSnapshot {
    type Target = [WatchedPath];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a WatchSnapshot {
    type Item = &'a WatchedPath;
    type IntoIter = std::slice::Iter<'a, WatchedPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
