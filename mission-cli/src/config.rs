//! Configuration loading for the `mc` client.
//!
//! Values are layered: environment variables win over the TOML file, which
//! wins over built-in defaults. The file is optional; its path comes from
//! `--config`, then `MC_CONFIG`, then `.mc-config.toml` in the working
//! directory when that file exists.

use mission_core::MissionError;
use mission_storage::{EntityStore, FileStore, HttpStore, HttpStoreConfig, MemoryStore};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "MC_CONFIG";
pub const STORE_URL_ENV: &str = "MC_STORE_URL";
pub const DEPLOY_KEY_ENV: &str = "MC_DEPLOY_KEY";
pub const DATA_PATH_ENV: &str = "MC_DATA_PATH";
pub const REQUEST_TIMEOUT_ENV: &str = "MC_REQUEST_TIMEOUT_MS";

pub const DEFAULT_CONFIG_FILE: &str = ".mc-config.toml";
pub const DEFAULT_DATA_PATH: &str = ".mission-control/store.json";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Which [`EntityStore`] backend the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    File,
    Memory,
    Http,
}

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub store: Option<StoreKind>,
    pub url: Option<String>,
    pub deploy_key: Option<String>,
    pub data_path: Option<PathBuf>,
    pub request_timeout_ms: Option<u64>,
}

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionConfig {
    pub store: StoreKind,
    pub url: Option<String>,
    pub deploy_key: Option<String>,
    pub data_path: PathBuf,
    pub request_timeout_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl MissionConfig {
    /// Load from the process environment and the config file, if any.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        let path = explicit_path
            .map(Path::to_path_buf)
            .or_else(|| env(CONFIG_PATH_ENV).map(PathBuf::from))
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.is_file().then_some(default)
            });

        let file = match path {
            Some(path) => ConfigFile::from_path(&path)?,
            None => ConfigFile::default(),
        };
        Self::from_layers(file, env)
    }

    /// Merge `file` with environment values looked up through `env`, then validate.
    ///
    /// When no store kind is configured, a configured URL selects the HTTP
    /// store and its absence the file store.
    pub fn from_layers<F>(file: ConfigFile, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = env(STORE_URL_ENV).or(file.url);
        let deploy_key = env(DEPLOY_KEY_ENV).or(file.deploy_key);
        let data_path = env(DATA_PATH_ENV)
            .map(PathBuf::from)
            .or(file.data_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let request_timeout_ms = match env(REQUEST_TIMEOUT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: format!("{} must be an integer, got '{}'", REQUEST_TIMEOUT_ENV, raw),
            })?,
            None => file
                .request_timeout_ms
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS),
        };
        let store = file.store.unwrap_or(if url.is_some() {
            StoreKind::Http
        } else {
            StoreKind::File
        });

        let config = Self {
            store,
            url,
            deploy_key,
            data_path,
            request_timeout_ms,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        match self.store {
            StoreKind::Http => {
                let url = self.url.as_deref().map(str::trim).unwrap_or_default();
                if url.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "url",
                        reason: "required when store = \"http\"".to_string(),
                    });
                }
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::InvalidValue {
                        field: "url",
                        reason: format!("must start with http:// or https://, got '{}'", url),
                    });
                }
            }
            StoreKind::File => {
                if self.data_path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidValue {
                        field: "data_path",
                        reason: "must not be empty".to_string(),
                    });
                }
            }
            StoreKind::Memory => {}
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Build the configured store backend.
    pub fn open_store(&self) -> Result<Box<dyn EntityStore>, MissionError> {
        let store: Box<dyn EntityStore> = match self.store {
            StoreKind::File => Box::new(FileStore::new(&self.data_path)),
            StoreKind::Memory => Box::new(MemoryStore::new()),
            StoreKind::Http => Box::new(HttpStore::new(&HttpStoreConfig {
                url: self.url.clone().unwrap_or_default(),
                deploy_key: self.deploy_key.clone(),
                request_timeout: self.request_timeout(),
            })?),
        };
        tracing::debug!(store = ?self.store, "Store opened");
        Ok(store)
    }
}

impl ConfigFile {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }
}
