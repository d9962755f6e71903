//! Connection settings.
//!
//! Settings come from a JSON file and are overridden field by field by
//! `ODOO_*` environment variables.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Config file name searched in the working directory.
pub const CONFIG_FILE_NAME: &str = "odoo_config.json";

/// Resolved connection settings for the Odoo backend.
#[derive(Clone, PartialEq, Eq)]
pub struct OdooConfig {
    pub url: String,
    pub db: String,
    pub username: String,
    pub password: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for OdooConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdooConfig")
            .field("url", &self.url)
            .field("db", &self.db)
            .field("username", &self.username)
            .field("password", &"***hidden***")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Partially specified settings, as read from a file or the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigSource {
    pub url: Option<String>,
    pub db: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(alias = "timeout")]
    pub timeout_secs: Option<u64>,
}

impl ConfigSource {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: ConfigSource) -> ConfigSource {
        ConfigSource {
            url: other.url.or(self.url),
            db: other.db.or(self.db),
            username: other.username.or(self.username),
            password: other.password.or(self.password),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Read overrides from `ODOO_URL`, `ODOO_DB`, `ODOO_USERNAME`,
    /// `ODOO_PASSWORD` and `ODOO_TIMEOUT` via `lookup`.
    pub fn from_env_with<F>(lookup: F) -> Result<ConfigSource, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs = match lookup("ODOO_TIMEOUT") {
            Some(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                env: "ODOO_TIMEOUT",
                value: raw.clone(),
            })?),
            None => None,
        };

        Ok(ConfigSource {
            url: lookup("ODOO_URL"),
            db: lookup("ODOO_DB"),
            username: lookup("ODOO_USERNAME"),
            password: lookup("ODOO_PASSWORD"),
            timeout_secs,
        })
    }

    /// Read overrides from the process environment.
    pub fn from_env() -> Result<ConfigSource, ConfigError> {
        Self::from_env_with(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Check that every required field is present.
    pub fn finish(self) -> Result<OdooConfig, ConfigError> {
        Ok(OdooConfig {
            url: self.url.ok_or(ConfigError::Missing {
                field: "url",
                env: "ODOO_URL",
            })?,
            db: self.db.ok_or(ConfigError::Missing {
                field: "db",
                env: "ODOO_DB",
            })?,
            username: self.username.ok_or(ConfigError::Missing {
                field: "username",
                env: "ODOO_USERNAME",
            })?,
            password: self.password.ok_or(ConfigError::Missing {
                field: "password",
                env: "ODOO_PASSWORD",
            })?,
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }
}

/// Load a config file.
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if the file doesn't exist,
/// or `ConfigError::InvalidJson` if the file isn't valid JSON.
pub fn load_config_file(path: &Path) -> Result<ConfigSource, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_config_str(&content)
}

/// Load config settings from a JSON string.
pub fn load_config_str(content: &str) -> Result<ConfigSource, ConfigError> {
    serde_json::from_str(content).map_err(|source| ConfigError::InvalidJson { source })
}

/// Default config file locations, most specific first.
pub fn default_config_paths(home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Some(home) = home {
        paths.push(home.join(".config").join("odoo").join("config.json"));
        paths.push(home.join(".odoo_config.json"));
    }
    paths
}

/// Load the effective configuration.
///
/// Uses `explicit` if given (it must exist), otherwise the first existing
/// default location, then applies environment overrides.
pub fn load_config(explicit: Option<&Path>) -> Result<OdooConfig, ConfigError> {
    let file = match explicit {
        Some(path) => load_config_file(path)?,
        None => {
            let home = std::env::var_os("HOME").map(PathBuf::from);
            match default_config_paths(home.as_deref())
                .into_iter()
                .find(|p| p.exists())
            {
                Some(path) => load_config_file(&path)?,
                None => ConfigSource::default(),
            }
        }
    };

    file.merge(ConfigSource::from_env()?).finish()
}
