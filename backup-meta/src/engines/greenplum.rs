//! Greenplum backup sentinels and restore points.
//!
//! Restore points are named markers taken across all segments. They are
//! listed and rendered with the same machinery as backups, but carry their
//! own metadata object instead of a backup sentinel.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::list::retrieve::{join_with_metadata, strip_wal_file_name, MissingMetadata};
use crate::metadata::sentinel::{modify_backup_sentinel, Backup};
use crate::metadata::timestamp::{to_utc, SentinelTime};
use crate::metadata::{
    BackupTime, BackupTimeWithMetadata, GenericMetaFetcher, GenericMetaSetter, GenericMetadata,
    IncrementSource,
};
use crate::storage::Folder;
use crate::{CatalogError, Result};

/// Suffix of restore point metadata objects
pub const RESTORE_POINT_SUFFIX: &str = "_restore_point.json";

pub fn restore_point_metadata_name(point_name: &str) -> String {
    format!("{}{}", point_name, RESTORE_POINT_SUFFIX)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupSentinelDto {
    #[serde(default)]
    pub restore_point: Option<String>,
    #[serde(default)]
    pub start_time: SentinelTime,
    #[serde(default)]
    pub finish_time: SentinelTime,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub gp_version: String,
    #[serde(default)]
    pub is_permanent: bool,
    #[serde(default)]
    pub uncompressed_size: i64,
    #[serde(default)]
    pub compressed_size: i64,
    #[serde(default)]
    pub user_data: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GreenplumMetaInteractor;

impl GreenplumMetaInteractor {
    pub fn new() -> Self {
        Self
    }
}

impl GenericMetaFetcher for GreenplumMetaInteractor {
    fn fetch(&self, backup_name: &str, folder: &dyn Folder) -> Result<GenericMetadata> {
        let sentinel: BackupSentinelDto = Backup::new(folder, backup_name).fetch_sentinel()?;

        Ok(GenericMetadata {
            backup_name: backup_name.to_string(),
            uncompressed_size: sentinel.uncompressed_size,
            compressed_size: sentinel.compressed_size,
            hostname: sentinel.hostname,
            start_time: to_utc(sentinel.start_time),
            finish_time: to_utc(sentinel.finish_time),
            is_permanent: sentinel.is_permanent,
            increment_details: IncrementSource::Unsupported,
            user_data: sentinel.user_data,
        })
    }
}

impl GenericMetaSetter for GreenplumMetaInteractor {
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

/// Metadata stored for each restore point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestorePointMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_time: SentinelTime,
    #[serde(default)]
    pub finish_time: SentinelTime,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub gp_version: String,
    #[serde(default)]
    pub system_identifier: Option<u64>,
    /// Restore point LSN per segment content id
    #[serde(default)]
    pub lsn_by_segment: BTreeMap<i32, String>,
}

/// Reads restore point metadata objects into the generic shape
#[derive(Debug, Default, Clone, Copy)]
pub struct RestorePointMetaFetcher;

impl RestorePointMetaFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl GenericMetaFetcher for RestorePointMetaFetcher {
    fn fetch(&self, point_name: &str, folder: &dyn Folder) -> Result<GenericMetadata> {
        let content = folder.get_object(&restore_point_metadata_name(point_name))?;
        let point: RestorePointMetadata = serde_json::from_slice(&content)?;

        Ok(GenericMetadata {
            backup_name: point_name.to_string(),
            hostname: point.hostname,
            start_time: to_utc(point.start_time),
            finish_time: to_utc(point.finish_time),
            ..Default::default()
        })
    }
}

/// Restore points present in `folder`, or `NoRestorePointsFound`
pub fn get_restore_points(folder: &dyn Folder) -> Result<Vec<BackupTime>> {
    let points: Vec<BackupTime> = folder
        .list_objects()?
        .into_iter()
        .filter_map(|object| {
            let name = object.name.strip_suffix(RESTORE_POINT_SUFFIX)?.to_string();
            Some(BackupTime {
                wal_file_name: strip_wal_file_name(&name),
                backup_name: name,
                time: Some(object.last_modified),
            })
        })
        .collect();

    if points.is_empty() {
        return Err(CatalogError::NoRestorePointsFound);
    }
    Ok(points)
}

/// Restore points joined with their metadata. A point whose metadata cannot
/// be read is still listed, with zero-valued metadata.
pub fn get_restore_points_with_metadata<F>(
    folder: &dyn Folder,
    fetcher: &F,
) -> Result<Vec<BackupTimeWithMetadata>>
where
    F: GenericMetaFetcher + ?Sized,
{
    let points = get_restore_points(folder)?;
    join_with_metadata(points, folder, fetcher, MissingMetadata::ZeroValue)
}
