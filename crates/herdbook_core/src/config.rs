//! Runtime configuration for embedding callers and the CLI smoke run.
//!
//! # Invariants
//! - Missing values fall back to defaults; malformed values are rejected.
//! - `log_dir`, when set, must be absolute (enforced by `init_logging`).

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default SQLite busy timeout in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub const ENV_DB_PATH: &str = "HERDBOOK_DB";
pub const ENV_LOG_LEVEL: &str = "HERDBOOK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "HERDBOOK_LOG_DIR";
pub const ENV_BUSY_TIMEOUT_MS: &str = "HERDBOOK_BUSY_TIMEOUT_MS";

/// Core settings shared by every entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Database file. `None` means an in-memory database.
    pub db_path: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub busy_timeout_ms: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl CoreConfig {
    /// Builds configuration from `HERDBOOK_*` process environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
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
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = read(ENV_BUSY_TIMEOUT_MS) {
            config.busy_timeout_ms = raw.parse::<u64>().map_err(|_| {
                format!("{ENV_BUSY_TIMEOUT_MS} must be a non-negative integer, got `{raw}`")
            })?;
        }
        Ok(config)
    }
}
