//! Client-facing watch API.
//!
//! Thin adapter over [`WatchRegistry`] with the shape a UI page consumes:
//! `list()` returns strings, `add()` returns `(ok, error message)`, and
//! `remove()` is best effort. Every response is a plain value so it can be
//! rendered directly or serialized over any transport.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::registry::{ErrorKind, WatchRegistry};

/// Result of [`WatchApi::add`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddResponse {
    pub ok: bool,
    /// Human-readable failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    /// Canonical form of the added path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Result of [`WatchApi::remove`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveResponse {
    pub removed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of [`WatchApi::prune`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneResponse {
    pub pruned: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Watch API bound to a shared registry.
#[derive(Debug, Clone)]
pub struct WatchApi {
    registry: Arc<WatchRegistry>,
}

impl WatchApi {
    pub fn new(registry: Arc<WatchRegistry>) -> Self {
        Self { registry }
    }

    /// Watched folders in insertion order.
    pub fn list(&self) -> Vec<String> {
        self.registry.list().to_strings()
    }

    /// Start watching `path`.
    pub fn add(&self, path: impl AsRef<Path>) -> AddResponse {
        match self.registry.add(path) {
            Ok(entry) => AddResponse {
                ok: true,
                error: None,
                kind: None,
                path: Some(entry.to_string()),
            },
            Err(e) => AddResponse {
                ok: false,
                error: Some(e.to_string()),
                kind: Some(e.kind()),
                path: None,
            },
        }
    }

    /// Stop watching `path`. Unknown paths are not an error.
    pub fn remove(&self, path: impl AsRef<Path>) -> RemoveResponse {
        match self.registry.remove(path) {
            Ok(removed) => RemoveResponse {
                removed,
                error: None,
            },
            Err(e) => {
                tracing::error!("[api] remove failed: {e}");
                RemoveResponse {
                    removed: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// Watched folders that no longer exist.
    pub fn check(&self) -> Vec<String> {
        self.registry.stale().iter().map(|e| e.to_string()).collect()
    }

    /// Drop watched folders that no longer exist.
    pub fn prune(&self) -> PruneResponse {
        match self.registry.prune() {
            Ok(pruned) => PruneResponse {
                pruned: pruned.iter().map(|e| e.to_string()).collect(),
                error: None,
            },
            Err(e) => PruneResponse {
                pruned: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}
