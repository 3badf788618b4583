//! Configuration for the syncer.
//!
//! Layered with figment, lowest precedence first:
//! - Default values
//! - TOML settings file (`--config`, else `.docker-syncer/settings.toml` in
//!   the current directory or an ancestor, else the user config directory)
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `SYNCER_` and use double
//! underscores to separate nested levels:
//! - `SYNCER_SYNC__CONTAINER_NAME=web` sets `sync.container_name`
//! - `SYNCER_RUNTIME__BINARY=podman` sets `runtime.binary`
//! - `SYNCER_LOGGING__DEFAULT=debug` sets `logging.default`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::watcher::DEFAULT_IGNORED_SUFFIXES;

/// Directory holding a project-local settings file.
pub const CONFIG_DIR: &str = ".docker-syncer";
/// Settings file name.
pub const CONFIG_FILE: &str = "settings.toml";
/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SYNCER_";

/// Errors while loading or validating settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Missing required setting `{0}`")]
    Missing(&'static str),

    #[error("Setting `{0}` must not be empty")]
    Empty(&'static str),

    #[error("Host path {path} is not a usable directory: {reason}")]
    InvalidHostPath { path: PathBuf, reason: String },
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    /// What to sync where
    #[serde(default)]
    pub sync: SyncSettings,

    /// Container runtime invocation
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Events to skip
    #[serde(default)]
    pub ignore: IgnoreConfig,

    /// Diagnostic logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SyncSettings {
    /// Host directory to watch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_path: Option<PathBuf>,

    /// Target directory inside the container
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_path: Option<String>,

    /// Target container name or id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,

    /// Owner applied to synced files
    #[serde(default = "default_owner")]
    pub user: String,

    /// Group applied to synced files
    #[serde(default = "default_owner")]
    pub group: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RuntimeConfig {
    /// Container runtime CLI
    #[serde(default = "default_runtime_binary")]
    pub binary: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IgnoreConfig {
    /// Backup/swap file suffixes whose events are skipped
    #[serde(default = "default_ignored_suffixes")]
    pub suffixes: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level for all targets
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-target overrides, e.g. `docker_syncer = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions
fn default_owner() -> String {
    "www-data".to_string()
}
fn default_runtime_binary() -> PathBuf {
    PathBuf::from("docker")
}
fn default_ignored_suffixes() -> Vec<String> {
    DEFAULT_IGNORED_SUFFIXES.iter().map(|s| s.to_string()).collect()
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            host_path: None,
            container_path: None,
            container_name: None,
            user: default_owner(),
            group: default_owner(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            binary: default_runtime_binary(),
        }
    }
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            suffixes: default_ignored_suffixes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

/// Validated, immutable sync parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Absolute, canonical host root.
    pub host_path: PathBuf,
    /// Container directory mirroring the host root, without trailing `/`.
    pub container_path: String,
    pub container_name: String,
    pub user: String,
    pub group: String,
}

impl Settings {
    /// Load configuration from all sources.
    ///
    /// `config_file` overrides settings file discovery.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));

        match config_file {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                if let Some(path) = Self::find_config_file() {
                    crate::debug_event!("config", "settings file", "{}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        figment
            // Double underscore separates nested levels, single underscore
            // stays part of the field name
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
            )
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Load configuration from a specific file, without environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Find the settings file: project-local first, then per-user.
    fn find_config_file() -> Option<PathBuf> {
        if let Ok(current) = std::env::current_dir() {
            for ancestor in current.ancestors() {
                let candidate = ancestor.join(CONFIG_DIR).join(CONFIG_FILE);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }

        let global = dirs::config_dir()?.join("docker-syncer").join(CONFIG_FILE);
        global.is_file().then_some(global)
    }

    /// Render the merged settings as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Validate into the immutable [`SyncConfig`].
    pub fn sync_config(&self) -> Result<SyncConfig, ConfigError> {
        let sync = &self.sync;

        let host_path = sync
            .host_path
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ConfigError::Missing("host-path"))?;
        let container_path = required(sync.container_path.as_deref(), "container-path")?;
        let container_name = required(sync.container_name.as_deref(), "container-name")?;

        if sync.user.trim().is_empty() {
            return Err(ConfigError::Empty("user"));
        }
        if sync.group.trim().is_empty() {
            return Err(ConfigError::Empty("group"));
        }

        let canonical =
            host_path
                .canonicalize()
                .map_err(|e| ConfigError::InvalidHostPath {
                    path: host_path.clone(),
                    reason: e.to_string(),
                })?;
        if !canonical.is_dir() {
            return Err(ConfigError::InvalidHostPath {
                path: host_path.clone(),
                reason: "not a directory".to_string(),
            });
        }

        Ok(SyncConfig {
            host_path: canonical,
            container_path: trim_container_path(container_path),
            container_name: container_name.to_string(),
            user: sync.user.clone(),
            group: sync.group.clone(),
        })
    }
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, ConfigError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

/// Strip trailing slashes, keeping `/` itself.
fn trim_container_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
