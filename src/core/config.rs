//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Configuration is repo-scoped: an optional `pulse.toml` at the root of
//! the repository the tool operates on. A missing file means defaults;
//! unknown keys are rejected rather than silently ignored.
//!
//! # Example
//!
//! ```toml
//! [sync]
//! remote = "origin"
//! max_attempts = 3
//! retry_delay_secs = 5
//! command_timeout_secs = 120
//!
//! [activity]
//! file_prefix = "file."
//! messages_file = "commit_messages.txt"
//!
//! [schedule]
//! max_daily_runs = 35
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the per-repository configuration file.
pub const CONFIG_FILE: &str = "pulse.toml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// The file that was attempted
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file could not be parsed.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The file that was parsed
        path: PathBuf,
        /// The underlying TOML error
        #[source]
        source: toml::de::Error,
    },
}

/// Resolved configuration with defaults applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Synchronization settings
    pub sync: SyncConfig,
    /// File mutation and commit message settings
    pub activity: ActivityConfig,
    /// Daily scheduling settings
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Load configuration for the repository at `dir`.
    ///
    /// A missing `pulse.toml` yields the defaults.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Timeout applied to every external command individually.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.sync.command_timeout_secs)
    }

    /// Fixed delay between sync attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.sync.retry_delay_secs)
    }
}

/// Synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Remote to reconcile with (default: "origin")
    pub remote: String,
    /// Total sync attempts, including the first (default: 3)
    pub max_attempts: u32,
    /// Seconds between attempts (default: 5)
    pub retry_delay_secs: u64,
    /// Per-command timeout in seconds (default: 120)
    pub command_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            max_attempts: 3,
            retry_delay_secs: 5,
            command_timeout_secs: 120,
        }
    }
}

/// File mutation and commit message settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ActivityConfig {
    /// Name prefix of mutation candidates (default: "file.")
    pub file_prefix: String,
    /// Commit message pool, relative to the repository root
    /// (default: "commit_messages.txt")
    pub messages_file: PathBuf,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            file_prefix: "file.".to_string(),
            messages_file: PathBuf::from("commit_messages.txt"),
        }
    }
}

/// Daily scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Upper bound on runs scheduled per day (default: 35)
    pub max_daily_runs: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self { max_daily_runs: 35 }
    }
}
