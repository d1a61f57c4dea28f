//! Registry of watched folders.
//!
//! The registry owns the ordered set of folders a backend watches and is the
//! only writer of its persisted form.
//!
//! # Architecture
//!
//! ```text
//! WatchRegistry
//!   - PathResolver  (~ expansion, canonicalization)
//!   - WatchStore    (TOML file, atomic rewrite)
//!   - Snapshot      (Arc swapped after each successful persist)
//! ```

mod error;
mod path;
mod store;
mod types;
mod watch_registry;

pub use error::{ErrorKind, RegistryError, RegistryResult};
pub use path::{PathResolver, normalize_lexical};
pub use store::{DEFAULT_STORE_FILE, STORE_VERSION, WatchStore};
pub use types::{WatchSnapshot, WatchedPath};
pub use watch_registry::{RegistryOptions, WatchRegistry};

pub(crate) use store::write_atomic;
