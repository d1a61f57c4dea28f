//! Registry of watched folders.
//!
//! Tracks the set of directories a backend watches for changes: paths are
//! canonicalized, validated and deduplicated on the way in, and the ordered
//! set is persisted atomically so it survives restarts.

pub mod api;
pub mod cli;
pub mod config;
pub mod io;
pub mod logging;
pub mod registry;

pub use api::{AddResponse, PruneResponse, RemoveResponse, WatchApi};
pub use config::Settings;
pub use registry::{
    ErrorKind, RegistryError, RegistryOptions, RegistryResult, WatchRegistry, WatchSnapshot,
    WatchedPath,
};
