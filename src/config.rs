//! Configuration module.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `WATCHLIST_` and use double
//! underscores to separate nested levels:
//! - `WATCHLIST_REGISTRY__PRUNE_ON_LOAD=true` sets `registry.prune_on_load`
//! - `WATCHLIST_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::registry::{
    DEFAULT_STORE_FILE, RegistryOptions, RegistryResult, WatchRegistry, WatchStore, write_atomic,
};

/// Directory name under the platform config directory.
pub const APP_DIR: &str = "watchlist";

/// Settings file name.
pub const SETTINGS_FILE: &str = "settings.toml";

const ENV_PREFIX: &str = "WATCHLIST_";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Registry configuration
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// File these settings were loaded from
    #[serde(skip)]
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RegistryConfig {
    /// Location of the watch list. Relative paths resolve against the
    /// settings file directory. Defaults to `watched.toml` next to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,

    /// Drop folders that no longer exist when the registry is opened
    #[serde(default)]
    pub prune_on_load: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all modules
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

fn default_version() -> u32 {
    1
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            registry: RegistryConfig::default(),
            logging: LoggingConfig::default(),
            config_file: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Default settings file location: `<config dir>/watchlist/settings.toml`.
    ///
    /// Falls back to `.watchlist/settings.toml` when the platform has no
    /// config directory.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".watchlist"))
            .join(SETTINGS_FILE)
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from(Self::default_config_path())
    }

    /// Load configuration from a specific file.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        let path = path.as_ref();

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            // Double underscore separates nested levels
            .merge(Env::prefixed(ENV_PREFIX).map(|key| {
                key.as_str()
                    .to_lowercase()
                    .replace("__", ".")
                    .into()
            }))
            .extract()
            .map_err(Box::new)
            .map(|mut settings: Settings| {
                settings.config_file = Some(path.to_path_buf());
                settings
            })
    }

    /// Save current configuration to file, replacing it atomically
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let toml_string = toml::to_string_pretty(self)?;
        write_atomic(path.as_ref(), toml_string.as_bytes())?;
        Ok(())
    }

    /// Create a default settings file at `path`.
    pub fn init_config_file(
        path: impl AsRef<Path>,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = path.as_ref();

        if !force && path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        Settings::default().save(path)?;
        tracing::info!("[config] wrote default settings to {}", path.display());

        Ok(path.to_path_buf())
    }

    /// Directory holding the settings file.
    fn config_dir(&self) -> PathBuf {
        let file = self
            .config_file
            .clone()
            .unwrap_or_else(Self::default_config_path);
        match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Resolved location of the watch list.
    pub fn store_path(&self) -> PathBuf {
        match &self.registry.store_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.config_dir().join(path),
            None => self.config_dir().join(DEFAULT_STORE_FILE),
        }
    }

    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions {
            prune_on_load: self.registry.prune_on_load,
            ..RegistryOptions::default()
        }
    }

    /// Open the registry described by these settings.
    pub fn open_registry(&self) -> RegistryResult<WatchRegistry> {
        WatchRegistry::with_options(WatchStore::new(self.store_path()), self.registry_options())
    }
}
