//! Client configuration.
//!
//! A [`Config`] is either built directly with [`Config::new`] or resolved by
//! [`Config::load`] from, in increasing precedence, built-in defaults, the
//! JSON config file in the platform config directory, and `WORDNIK_*`
//! environment variables. There is no built-in API key.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::serde_help::{deserialize_blank_as_none, deserialize_secs};

pub const DEFAULT_BASE_URI: &str = "http://api.wordnik.com/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub const API_KEY_VAR: &str = "WORDNIK_API_KEY";
pub const BASE_URI_VAR: &str = "WORDNIK_BASE_URI";
pub const TIMEOUT_VAR: &str = "WORDNIK_TIMEOUT_SECS";

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key configured; set WORDNIK_API_KEY or add \"api_key\" to the config file")]
    MissingApiKey,

    #[error("invalid base URI {uri:?}: {reason}")]
    InvalidBaseUri { uri: String, reason: String },

    #[error("invalid timeout {value:?}: expected a positive whole number of seconds")]
    InvalidTimeout { value: String },

    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Everything a [`crate::Client`] needs: the secret key, where the service
/// lives, and how long to wait for it.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    api_key: String,
    base_uri: String,
    timeout: Duration,
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Config {
        Config {
            api_key: api_key.into(),
            base_uri: DEFAULT_BASE_URI.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Config {
        self.base_uri = base_uri.into();
        self
    }

    /// Deadline for each request. [`crate::Client::new`] rejects zero.
    pub fn with_timeout(mut self, timeout: Duration) -> Config {
        self.timeout = timeout;
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Resolves a config from the config file and the process environment.
    pub fn load() -> Result<Config, ConfigError> {
        let file = match config_path() {
            Some(path) => FileConfig::read(&path)?,
            None => None,
        };
        Config::resolve(file, |name| std::env::var(name).ok())
    }

    /// Layers `env` over `file` over the defaults.
    ///
    /// `env` is a lookup so callers (and tests) need not touch the real
    /// process environment.
    pub fn resolve<F>(file: Option<FileConfig>, env: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();
        let lookup = |name: &str| {
            env(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = lookup(API_KEY_VAR)
            .or(file.api_key)
            .ok_or(ConfigError::MissingApiKey)?;

        let base_uri = lookup(BASE_URI_VAR)
            .or(file.base_uri)
            .unwrap_or_else(|| DEFAULT_BASE_URI.to_string());

        let timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => parse_timeout(&raw)?,
            None => match file.timeout {
                Some(t) if t.is_zero() => {
                    return Err(ConfigError::InvalidTimeout {
                        value: "0".to_string(),
                    })
                }
                Some(t) => t,
                None => DEFAULT_TIMEOUT,
            },
        };

        Ok(Config {
            api_key,
            base_uri,
            timeout,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_uri", &self.base_uri)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// The optional on-disk layer of the configuration.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub api_key: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blank_as_none")]
    pub base_uri: Option<String>,
    #[serde(default, rename = "timeout_secs", deserialize_with = "deserialize_secs")]
    pub timeout: Option<Duration>,
}

impl FileConfig {
    /// Reads `path`; a missing file is not an error.
    pub fn read(path: &Path) -> Result<Option<FileConfig>, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::trace!("no config file at {}", path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        log::debug!("loading config from {}", path.display());
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// `<platform config dir>/config.json`, if the platform has a home directory.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "Wordnik", "wordnik").map(|dir| dir.config_dir().join(CONFIG_FILE))
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidTimeout {
            value: raw.to_string(),
        }),
    }
}
