//! Error types for the watch registry.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from registry operations.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("Already watched: {}", path.display())]
    AlreadyWatched { path: PathBuf },

    #[error("Failed to persist watch list at {}: {source}", path.display())]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path is not valid UTF-8: {}", path.display())]
    InvalidPath { path: PathBuf },
}

/// Machine-readable classification of a [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotADirectory,
    PermissionDenied,
    AlreadyWatched,
    PersistenceFailure,
    InvalidPath,
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotADirectory { .. } => ErrorKind::NotADirectory,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::AlreadyWatched { .. } => ErrorKind::AlreadyWatched,
            Self::PersistenceFailure { .. } => ErrorKind::PersistenceFailure,
            Self::InvalidPath { .. } => ErrorKind::InvalidPath,
        }
    }

    /// Path the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotADirectory { path }
            | Self::PermissionDenied { path }
            | Self::AlreadyWatched { path }
            | Self::PersistenceFailure { path, .. }
            | Self::InvalidPath { path } => path,
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PersistenceFailure {
            path: path.into(),
            source,
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;
