//! Configuration management for the backup metadata catalog.
//!
//! Loads configuration from a TOML file; command-line flags override it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::engines::EngineKind;
use crate::storage::BASE_BACKUP_PATH;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory of the backup archive
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Sub-folder holding backups and sentinels
    #[serde(default = "default_backup_path")]
    pub backup_path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine whose sentinel format is read (postgres, mongo, sqlserver, greenplum)
    #[serde(default)]
    pub kind: EngineKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_storage_path() -> PathBuf {
    PathBuf::from("/var/lib/backups")
}

fn default_backup_path() -> String {
    BASE_BACKUP_PATH.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            backup_path: default_backup_path(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
