//! On-disk storage for the watch list.
//!
//! The store is a small TOML document holding the ordered list of canonical
//! paths. It is rewritten wholesale on every mutation through a temporary
//! file in the same directory followed by a rename, so readers of the file
//! only ever see the previous or the next complete version.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{RegistryError, RegistryResult};
use super::WatchedPath;

/// Current schema version of the store file.
pub const STORE_VERSION: u32 = 1;

/// File name used when no explicit store path is configured.
pub const DEFAULT_STORE_FILE: &str = "watched.toml";

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default = "default_version")]
    version: u32,

    #[serde(default)]
    paths: Vec<PathBuf>,
}

/// Just the schema version, read before overwriting an existing store.
#[derive(Debug, Deserialize)]
struct StoreHeader {
    #[serde(default = "default_version")]
    version: u32,
}

fn default_version() -> u32 {
    STORE_VERSION
}

/// Handle to the persisted watch list.
#[derive(Debug, Clone)]
pub struct WatchStore {
    path: PathBuf,
}

impl WatchStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted entries in their stored order.
    ///
    /// A missing file is an empty watch list. Exact duplicates (possible only
    /// through hand edits) are dropped, keeping the first occurrence. A store
    /// written by a newer schema is still readable, but [`save`](Self::save)
    /// refuses to replace it.
    pub fn load(&self) -> RegistryResult<Vec<WatchedPath>> {
        if !self.path.exists() {
            tracing::debug!("[store] no watch list at {}", self.path.display());
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| RegistryError::persistence(&self.path, e))?;

        let file: StoreFile = toml::from_str(&content).map_err(|e| {
            RegistryError::persistence(&self.path, io::Error::new(io::ErrorKind::InvalidData, e))
        })?;

        if file.version > STORE_VERSION {
            tracing::warn!(
                "[store] {} has schema version {}, newer than supported {STORE_VERSION}; it will not be rewritten",
                self.path.display(),
                file.version
            );
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(file.paths.len());
        for path in file.paths {
            if seen.insert(path.clone()) {
                entries.push(WatchedPath::new(path));
            } else {
                tracing::warn!(
                    "[store] dropping duplicate entry {} in {}",
                    path.display(),
                    self.path.display()
                );
            }
        }

        Ok(entries)
    }

    /// Atomically replace the store with `entries`.
    ///
    /// Fails without touching the file when it declares a newer schema
    /// version than this build writes.
    pub fn save(&self, entries: &[WatchedPath]) -> RegistryResult<()> {
        self.ensure_writable_schema()
            .and_then(|()| self.write_atomic(entries))
            .map_err(|e| RegistryError::persistence(&self.path, e))?;
        tracing::debug!(
            "[store] wrote {} entries to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }

    fn ensure_writable_schema(&self) -> io::Result<()> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        // An unparsable file was already rejected on load
        let Ok(header) = toml::from_str::<StoreHeader>(&content) else {
            return Ok(());
        };
        if header.version > STORE_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "store has schema version {}, this build only writes version {STORE_VERSION}",
                    header.version
                ),
            ));
        }
        Ok(())
    }

    fn write_atomic(&self, entries: &[WatchedPath]) -> io::Result<()> {
        let file = StoreFile {
            version: STORE_VERSION,
            paths: entries.iter().map(|e| e.path().to_path_buf()).collect(),
        };
        let body = toml::to_string_pretty(&file)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        write_atomic(&self.path, body.as_bytes())
    }
}

/// Write `contents` to `path` via a synced temporary file and a rename.
///
/// The temporary file lives next to the target so the rename never crosses
/// filesystems. It is removed if anything fails before the rename.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".watchlist-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(paths: &[&str]) -> Vec<WatchedPath> {
        paths.iter().map(|p| WatchedPath::new(PathBuf::from(p))).collect()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = WatchStore::new(temp_dir.path().join("watched.toml"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = WatchStore::new(temp_dir.path().join("nested/watched.toml"));

        let saved = entries(&["/srv/b", "/srv/a", "/srv/c"]);
        store.save(&saved).unwrap();

        assert_eq!(store.load().unwrap(), saved);
    }

    #[test]
    fn test_store_file_is_line_per_entry() {
        let temp_dir = TempDir::new().unwrap();
        let store = WatchStore::new(temp_dir.path().join("watched.toml"));
        store.save(&entries(&["/srv/one", "/srv/two"])).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("version = 1"));
        let one = content.lines().position(|l| l.contains("\"/srv/one\""));
        let two = content.lines().position(|l| l.contains("\"/srv/two\""));
        assert!(one.is_some() && two.is_some());
        assert_ne!(one, two, "each path should be on its own line");
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = WatchStore::new(temp_dir.path().join("watched.toml"));
        store.save(&entries(&["/srv/a"])).unwrap();
        store.save(&entries(&["/srv/a", "/srv/b"])).unwrap();

        let names: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["watched.toml".to_string()]);
    }

    #[test]
    fn test_load_drops_duplicate_entries() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("watched.toml");
        fs::write(
            &path,
            "version = 1\npaths = [\"/srv/a\", \"/srv/b\", \"/srv/a\"]\n",
        )
        .unwrap();

        let loaded = WatchStore::new(&path).load().unwrap();
        assert_eq!(loaded, entries(&["/srv/a", "/srv/b"]));
    }

    #[test]
    fn test_load_corrupt_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("watched.toml");
        fs::write(&path, "paths = [unterminated").unwrap();

        let err = WatchStore::new(&path).load().unwrap_err();
        assert!(matches!(err, RegistryError::PersistenceFailure { .. }));
        // The broken file is left for the user to inspect
        assert_eq!(fs::read_to_string(&path).unwrap(), "paths = [unterminated");
    }

    #[test]
    fn test_newer_schema_is_readable_but_not_overwritten() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("watched.toml");
        let original = "version = 2\npaths = [\"/srv/a\"]\n";
        fs::write(&path, original).unwrap();

        let store = WatchStore::new(&path);
        assert_eq!(store.load().unwrap(), entries(&["/srv/a"]));

        let err = store.save(&entries(&["/srv/a", "/srv/b"])).unwrap_err();
        assert!(matches!(err, RegistryError::PersistenceFailure { .. }));
        assert!(err.to_string().contains("schema version 2"));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_save_failure_keeps_previous_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("watched.toml");
        let store = WatchStore::new(&path);
        store.save(&entries(&["/srv/a"])).unwrap();

        // A parent that is a regular file makes the write impossible
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let broken = WatchStore::new(blocker.join("watched.toml"));
        assert!(matches!(
            broken.save(&entries(&["/srv/b"])),
            Err(RegistryError::PersistenceFailure { .. })
        ));

        assert_eq!(store.load().unwrap(), entries(&["/srv/a"]));
    }
}
