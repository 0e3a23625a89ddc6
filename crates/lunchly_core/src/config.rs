//! Runtime configuration for the booking core.
//!
//! # Responsibility
//! - Describe database, logging and customer-policy settings in one shape.
//! - Load settings from `LUNCHLY_*` environment variables.
//!
//! # Invariants
//! - Every field has a default, so an empty environment yields a usable
//!   in-memory configuration.
//! - Malformed values are rejected, never silently replaced by defaults.

use crate::db::DEFAULT_BUSY_TIMEOUT_MS;
use crate::logging::default_log_level;
use crate::repo::customer_repo::CustomerRepoOptions;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "LUNCHLY_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "LUNCHLY_BUSY_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "LUNCHLY_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LUNCHLY_LOG_DIR";
pub const ENV_RECHECK_PHONE_ON_UPDATE: &str = "LUNCHLY_RECHECK_PHONE_ON_UPDATE";

/// Configuration loading error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but its value cannot be interpreted.
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for `{key}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Top-level configuration consumed by the CLI and host applications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LunchlyConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub customers: CustomerRepoOptions,
}

/// SQLite connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file; `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

/// File logging settings. Logging stays off while `log_dir` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl LunchlyConfig {
    /// Builds configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.database.path = Some(PathBuf::from(path));
        }
        if let Some(value) = read(ENV_BUSY_TIMEOUT_MS) {
            config.database.busy_timeout_ms =
                value.parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_BUSY_TIMEOUT_MS,
                    value: value.clone(),
                })?;
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }
        config.logging.log_dir = read(ENV_LOG_DIR);
        if let Some(value) = read(ENV_RECHECK_PHONE_ON_UPDATE) {
            config.customers.recheck_phone_on_update =
                parse_flag(&value).ok_or(ConfigError::InvalidValue {
                    key: ENV_RECHECK_PHONE_ON_UPDATE,
                    value,
                })?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
