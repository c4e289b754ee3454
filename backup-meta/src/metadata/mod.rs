//! Backup metadata model.
//!
//! `BackupTime` is what the storage listing knows about a backup,
//! `GenericMetadata` is the engine-independent projection of its sentinel,
//! and `BackupTimeWithMetadata` joins the two for sorting and rendering.

pub mod sentinel;
pub mod timestamp;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::Folder;
use crate::Result;

/// Identity and coarse timing of one backup as known from the listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupTime {
    pub backup_name: String,

    /// Last modified time of the listed object, if the storage reports one
    pub time: Option<DateTime<Utc>>,

    /// WAL segment the backup started from, may be empty
    pub wal_file_name: String,
}

/// Details of an incremental backup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementDetails {
    pub increment_from: String,
    pub increment_full_name: String,
    pub increment_count: i32,
}

/// Whether and how a backup is incremental.
///
/// Engines without a notion of increments report `Unsupported`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IncrementSource {
    #[default]
    Unsupported,
    Known(IncrementDetails),
}

impl IncrementSource {
    pub fn is_incremental(&self) -> bool {
        matches!(self, IncrementSource::Known(_))
    }

    pub fn details(&self) -> Option<&IncrementDetails> {
        match self {
            IncrementSource::Unsupported => None,
            IncrementSource::Known(details) => Some(details),
        }
    }
}

/// Engine-independent view of a backup's sentinel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericMetadata {
    pub backup_name: String,
    pub uncompressed_size: i64,
    pub compressed_size: i64,
    pub hostname: String,
    pub start_time: Option<DateTime<Utc>>,
    pub finish_time: Option<DateTime<Utc>>,

    /// Permanent backups are skipped by retention
    pub is_permanent: bool,
    pub increment_details: IncrementSource,

    /// Opaque payload supplied by the user
    #[serde(default)]
    pub user_data: Value,
}

/// A listed backup together with its metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupTimeWithMetadata {
    #[serde(flatten)]
    pub backup_time: BackupTime,
    pub metadata: GenericMetadata,
}

impl BackupTimeWithMetadata {
    pub fn new(backup_time: BackupTime, metadata: GenericMetadata) -> Self {
        Self {
            backup_time,
            metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.backup_time.backup_name
    }
}

/// Reads a backup's sentinel into the generic shape
pub trait GenericMetaFetcher {
    fn fetch(&self, backup_name: &str, folder: &dyn Folder) -> Result<GenericMetadata>;
}

/// Amends the mutable fields of a backup's sentinel.
///
/// Both operations are a plain fetch-modify-upload with no concurrency
/// control: when two writers modify the same backup, the last upload wins.
pub trait GenericMetaSetter {
    fn set_user_data(&self, backup_name: &str, folder: &dyn Folder, user_data: Value) -> Result<()>;

    fn set_is_permanent(&self, backup_name: &str, folder: &dyn Folder, is_permanent: bool) -> Result<()>;
}

/// Full metadata capability of an engine
pub trait GenericMetaInteractor: GenericMetaFetcher + GenericMetaSetter {}

impl<T: GenericMetaFetcher + GenericMetaSetter> GenericMetaInteractor for T {}
