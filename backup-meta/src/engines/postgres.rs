//! PostgreSQL backup sentinels.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::metadata::sentinel::{modify_backup_sentinel, Backup};
use crate::metadata::timestamp::{to_utc, SentinelTime};
use crate::metadata::{
    GenericMetaFetcher, GenericMetaSetter, GenericMetadata, IncrementDetails, IncrementSource,
};
use crate::storage::Folder;
use crate::Result;

/// Sentinel written after a PostgreSQL base backup completes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BackupSentinelDto {
    #[serde(default)]
    pub start_time: SentinelTime,
    #[serde(default)]
    pub finish_time: SentinelTime,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub is_permanent: bool,
    #[serde(default)]
    pub uncompressed_size: i64,
    #[serde(default)]
    pub compressed_size: i64,

    /// Name of the backup this delta backup was taken against
    #[serde(rename = "DeltaFrom", default, skip_serializing_if = "Option::is_none")]
    pub increment_from: Option<String>,
    #[serde(rename = "DeltaFullName", default, skip_serializing_if = "Option::is_none")]
    pub increment_full_name: Option<String>,
    #[serde(rename = "DeltaCount", default, skip_serializing_if = "Option::is_none")]
    pub increment_count: Option<i32>,

    #[serde(default)]
    pub user_data: Value,

    /// Fields this adapter does not interpret, kept across modifications
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BackupSentinelDto {
    fn increment_source(&self) -> IncrementSource {
        match &self.increment_from {
            Some(from) => IncrementSource::Known(IncrementDetails {
                increment_from: from.clone(),
                increment_full_name: self.increment_full_name.clone().unwrap_or_default(),
                increment_count: self.increment_count.unwrap_or_default(),
            }),
            None => IncrementSource::Unsupported,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresMetaInteractor;

impl PostgresMetaInteractor {
    pub fn new() -> Self {
        Self
    }
}

impl GenericMetaFetcher for PostgresMetaInteractor {
    fn fetch(&self, backup_name: &str, folder: &dyn Folder) -> Result<GenericMetadata> {
        let sentinel: BackupSentinelDto = Backup::new(folder, backup_name).fetch_sentinel()?;

        Ok(GenericMetadata {
            backup_name: backup_name.to_string(),
            uncompressed_size: sentinel.uncompressed_size,
            compressed_size: sentinel.compressed_size,
            hostname: sentinel.hostname.clone(),
            start_time: to_utc(sentinel.start_time),
            finish_time: to_utc(sentinel.finish_time),
            is_permanent: sentinel.is_permanent,
            increment_details: sentinel.increment_source(),
            user_data: sentinel.user_data,
        })
    }
}

impl GenericMetaSetter for PostgresMetaInteractor {
    fn set_user_data(&self, backup_name: &str, folder: &dyn Folder, user_data: Value) -> Result<()> {
        modify_backup_sentinel(folder, backup_name, |mut dto: BackupSentinelDto| {
            dto.user_data = user_data;
            dto
        })
    }

    fn set_is_permanent(&self, backup_name: &str, folder: &dyn Folder, is_permanent: bool) -> Result<()> {
        modify_backup_sentinel(folder, backup_name, |mut dto: BackupSentinelDto| {
            dto.is_permanent = is_permanent;
            dto
        })
    }
}
