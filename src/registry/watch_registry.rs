//! The watch registry service object.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};

use super::error::{RegistryError, RegistryResult};
use super::path::{PathResolver, normalize_lexical};
use super::store::WatchStore;
use super::types::{WatchSnapshot, WatchedPath};
use crate::{debug_event, log_event};

/// Options controlling how a registry is opened.
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Directory substituted for a leading `~`.
    pub home_dir: Option<PathBuf>,
    /// Drop entries whose directory no longer exists right after loading.
    pub prune_on_load: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            home_dir: dirs::home_dir(),
            prune_on_load: false,
        }
    }
}

/// Ordered, deduplicated, persisted set of watched folders.
///
/// Mutations are serialized by a writer lock held across
/// validate → persist → publish. Readers clone the current [`WatchSnapshot`]
/// under a short read lock and never observe a half-applied change: the new
/// snapshot is published only after the store was rewritten.
#[derive(Debug)]
pub struct WatchRegistry {
    store: WatchStore,
    resolver: PathResolver,
    snapshot: RwLock<WatchSnapshot>,
    writer: Mutex<()>,
}

impl WatchRegistry {
    /// Open the registry persisted at `store_path` with default options.
    pub fn open(store_path: impl Into<PathBuf>) -> RegistryResult<Self> {
        Self::with_options(WatchStore::new(store_path), RegistryOptions::default())
    }

    /// Open the registry backed by `store`.
    pub fn with_options(store: WatchStore, options: RegistryOptions) -> RegistryResult<Self> {
        let resolver = PathResolver::new(options.home_dir);
        let entries = canonicalize_entries(&resolver, store.path(), store.load()?);
        debug_event!(
            "registry",
            "loaded",
            "{} entries from {}",
            entries.len(),
            store.path().display()
        );

        let registry = Self {
            store,
            resolver,
            snapshot: RwLock::new(WatchSnapshot::new(entries)),
            writer: Mutex::new(()),
        };

        if options.prune_on_load {
            if let Err(e) = registry.prune() {
                tracing::warn!("[registry] prune on load failed, keeping stored entries: {e}");
            }
        }

        Ok(registry)
    }

    /// Location of the backing store.
    pub fn store_path(&self) -> &Path {
        self.store.path()
    }

    /// Current contents in insertion order.
    pub fn list(&self) -> WatchSnapshot {
        self.snapshot.read().clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a folder to the registry.
    ///
    /// The path is canonicalized and must be an existing, readable directory
    /// not already present. On success the store is rewritten and the
    /// canonical entry returned.
    pub fn add(&self, raw: impl AsRef<Path>) -> RegistryResult<WatchedPath> {
        let _guard = self.writer.lock();

        let canonical = self.resolver.canonical_dir(raw.as_ref())?;
        let current = self.list();
        if current.contains(&canonical) {
            return Err(RegistryError::AlreadyWatched { path: canonical });
        }

        let entry = WatchedPath::new(canonical);
        let mut next = current.to_vec();
        next.push(entry.clone());
        self.commit(next)?;

        log_event!("registry", "added", "{entry}");
        Ok(entry)
    }

    /// Remove a folder from the registry.
    ///
    /// Returns `Ok(false)` when the path is not watched. The path does not
    /// need to exist anymore.
    pub fn remove(&self, raw: impl AsRef<Path>) -> RegistryResult<bool> {
        let _guard = self.writer.lock();

        let current = self.list();
        let Some(index) = self.position(&current, raw.as_ref()) else {
            debug_event!("registry", "remove skipped", "{} is not watched", raw.as_ref().display());
            return Ok(false);
        };

        let mut next = current.to_vec();
        let removed = next.remove(index);
        self.commit(next)?;

        log_event!("registry", "removed", "{removed}");
        Ok(true)
    }

    /// Whether `raw` resolves to a watched folder.
    pub fn contains(&self, raw: impl AsRef<Path>) -> bool {
        self.position(&self.list(), raw.as_ref()).is_some()
    }

    /// Entries whose directory no longer exists.
    pub fn stale(&self) -> Vec<WatchedPath> {
        self.list().iter().filter(|e| !e.exists()).cloned().collect()
    }

    /// Remove all stale entries in a single rewrite and return them.
    pub fn prune(&self) -> RegistryResult<Vec<WatchedPath>> {
        let _guard = self.writer.lock();

        let current = self.list();
        let (kept, stale): (Vec<_>, Vec<_>) = current.iter().cloned().partition(|e| e.exists());
        if stale.is_empty() {
            return Ok(stale);
        }

        self.commit(kept)?;
        for entry in &stale {
            tracing::warn!("[registry] pruned missing folder: {entry}");
        }
        Ok(stale)
    }

    /// Re-read the store, replacing the in-memory state.
    pub fn reload(&self) -> RegistryResult<()> {
        let _guard = self.writer.lock();
        let entries = canonicalize_entries(&self.resolver, self.store.path(), self.store.load()?);
        *self.snapshot.write() = WatchSnapshot::new(entries);
        Ok(())
    }

    fn position(&self, snapshot: &WatchSnapshot, raw: &Path) -> Option<usize> {
        let resolved = self.resolver.resolve_lenient(raw);
        if let Some(index) = snapshot.iter().position(|e| e.path() == resolved) {
            return Some(index);
        }

        // A symlinked ancestor retargeted after the add no longer resolves
        // to the stored entry
        let lexical = self
            .resolver
            .expand_home(raw)
            .map(|p| normalize_lexical(&p))?;
        snapshot.iter().position(|e| e.path() == lexical)
    }

    /// Persist `next`, then publish it. Caller holds the writer lock.
    fn commit(&self, next: Vec<WatchedPath>) -> RegistryResult<()> {
        self.store.save(&next)?;
        *self.snapshot.write() = WatchSnapshot::new(next);
        Ok(())
    }
}

/// Bring entries read from the store to canonical form.
///
/// Hand-edited stores may hold `~`, relative or symlinked entries. Relative
/// entries resolve against the store's directory. Entries that collapse onto
/// the same canonical path keep only the first occurrence.
fn canonicalize_entries(
    resolver: &PathResolver,
    store_path: &Path,
    entries: Vec<WatchedPath>,
) -> Vec<WatchedPath> {
    let base = match store_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut seen = HashSet::new();
    let mut canonical = Vec::with_capacity(entries.len());
    for entry in entries {
        let stored = entry.path();
        let expanded = resolver
            .expand_home(stored)
            .unwrap_or_else(|| stored.to_path_buf());
        let anchored = if expanded.is_relative() {
            base.join(expanded)
        } else {
            expanded
        };

        let mut resolved = resolver.resolve_lenient(&anchored);
        if resolved.to_str().is_none() {
            tracing::warn!(
                "[registry] {} resolves to a non UTF-8 path, keeping it as stored",
                stored.display()
            );
            resolved = stored.to_path_buf();
        } else if resolved.as_path() != stored {
            tracing::warn!(
                "[registry] stored entry {} resolves to {}",
                stored.display(),
                resolved.display()
            );
        }

        if seen.insert(resolved.clone()) {
            canonical.push(WatchedPath::new(resolved));
        } else {
            tracing::warn!(
                "[registry] dropping {}, it duplicates an earlier entry",
                stored.display()
            );
        }
    }
    canonical
}
