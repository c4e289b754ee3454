//! Retrieval of listable backups, normalized for the list handler.
//!
//! Engines report an empty archive as an error (`NoBackupsFound`,
//! `NoRestorePointsFound`); the `list_*` functions turn that into an empty
//! list and pass every other error through unchanged.

use std::sync::LazyLock;

use regex::Regex;

use crate::metadata::sentinel::SENTINEL_SUFFIX;
use crate::metadata::{BackupTime, BackupTimeWithMetadata, GenericMetaFetcher, GenericMetadata};
use crate::storage::Folder;
use crate::{CatalogError, Result};

static WAL_SEGMENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[0-9A-F]{24}").expect("valid WAL segment pattern"));

/// WAL segment a backup name refers to: the first run of 24 upper-case hex
/// digits in the name, or 24 `Z`s when there is none.
pub fn strip_wal_file_name(name: &str) -> String {
    match WAL_SEGMENT_NAME.find(name) {
        Some(found) => found.as_str().to_string(),
        None => "Z".repeat(24),
    }
}

/// What to do when a listed item has no readable metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingMetadata {
    /// Abort the whole retrieval with the fetch error
    Fail,
    /// Keep the item with zero-valued metadata carrying its name
    ZeroValue,
}

/// Fetch metadata for each listed item, one at a time, preserving order
pub fn join_with_metadata<F>(
    times: Vec<BackupTime>,
    folder: &dyn Folder,
    fetcher: &F,
    on_missing: MissingMetadata,
) -> Result<Vec<BackupTimeWithMetadata>>
where
    F: GenericMetaFetcher + ?Sized,
{
    let mut joined = Vec::with_capacity(times.len());
    for time in times {
        let metadata = match fetcher.fetch(&time.backup_name, folder) {
            Ok(metadata) => metadata,
            Err(e) if on_missing == MissingMetadata::ZeroValue => {
                tracing::debug!("No metadata for {}: {}", time.backup_name, e);
                GenericMetadata {
                    backup_name: time.backup_name.clone(),
                    ..Default::default()
                }
            }
            Err(e) => return Err(e),
        };
        joined.push(BackupTimeWithMetadata::new(time, metadata));
    }
    Ok(joined)
}

/// Backups with a sentinel in `folder`, or `NoBackupsFound`
pub fn get_backups(folder: &dyn Folder) -> Result<Vec<BackupTime>> {
    let backups: Vec<BackupTime> = folder
        .list_objects()?
        .into_iter()
        .filter_map(|object| {
            let name = object.name.strip_suffix(SENTINEL_SUFFIX)?.to_string();
            Some(BackupTime {
                wal_file_name: strip_wal_file_name(&name),
                backup_name: name,
                time: Some(object.last_modified),
            })
        })
        .collect();

    if backups.is_empty() {
        return Err(CatalogError::NoBackupsFound);
    }
    Ok(backups)
}

/// Backups joined with their metadata; any fetch failure fails the listing
pub fn get_backups_with_metadata<F>(
    folder: &dyn Folder,
    fetcher: &F,
) -> Result<Vec<BackupTimeWithMetadata>>
where
    F: GenericMetaFetcher + ?Sized,
{
    let backups = get_backups(folder)?;
    join_with_metadata(backups, folder, fetcher, MissingMetadata::Fail)
}

/// Turns the "nothing to list" signals into an empty list
pub fn ignore_empty_result<T>(result: Result<Vec<T>>) -> Result<Vec<T>> {
    match result {
        Err(e) if e.is_empty_result() => Ok(Vec::new()),
        other => other,
    }
}

/// Normalized backup retrieval for the list handler
pub fn list_backups<F>(folder: &dyn Folder, fetcher: &F) -> Result<Vec<BackupTimeWithMetadata>>
where
    F: GenericMetaFetcher + ?Sized,
{
    ignore_empty_result(get_backups_with_metadata(folder, fetcher))
}

/// Normalized restore point retrieval for the list handler
pub fn list_restore_points<F>(
    folder: &dyn Folder,
    fetcher: &F,
) -> Result<Vec<BackupTimeWithMetadata>>
where
    F: GenericMetaFetcher + ?Sized,
{
    ignore_empty_result(crate::engines::greenplum::get_restore_points_with_metadata(
        folder, fetcher,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::postgres::PostgresMetaInteractor;
    use crate::metadata::sentinel::sentinel_name_from_backup;
    use crate::storage::{MemoryFolder, ObjectInfo};
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};

    /// Folder whose listing always fails
    struct UnreachableFolder;

    impl Folder for UnreachableFolder {
        fn path(&self) -> &str {
            "unreachable/"
        }

        fn get_object(&self, key: &str) -> Result<Bytes> {
            Err(CatalogError::NotFound(key.to_string()))
        }

        fn put_object(&self, _key: &str, _content: Bytes) -> Result<()> {
            Ok(())
        }

        fn list_objects(&self) -> Result<Vec<ObjectInfo>> {
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "storage down").into())
        }

        fn sub_folder(&self, _path: &str) -> Box<dyn Folder> {
            Box::new(UnreachableFolder)
        }
    }

    #[test]
    fn test_strip_wal_file_name() {
        assert_eq!(
            strip_wal_file_name("base_000000010000000000000002"),
            "000000010000000000000002"
        );
        assert_eq!(
            strip_wal_file_name("base_000000010000000000000004_D_000000010000000000000002"),
            "000000010000000000000004"
        );
        assert_eq!(strip_wal_file_name("stream_20240101T000000Z"), "ZZZZZZZZZZZZZZZZZZZZZZZZ");
        // Lower-case hex is not a WAL segment name.
        assert_eq!(
            strip_wal_file_name("base_00000001000000000000000a"),
            "Z".repeat(24)
        );
    }

    #[test]
    fn test_get_backups_from_sentinels() -> Result<()> {
        let folder = MemoryFolder::new();
        let modified = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        folder.put_object_at(
            &sentinel_name_from_backup("base_000000010000000000000002"),
            Bytes::from_static(b"{}"),
            modified,
        );
        folder.put_object("base_000000010000000000000002/tar_partitions/part_1.tar.lz4", Bytes::from_static(b"x"))?;
        folder.put_object("unrelated.json", Bytes::from_static(b"{}"))?;

        let backups = get_backups(&folder)?;
        assert_eq!(
            backups,
            vec![BackupTime {
                backup_name: "base_000000010000000000000002".to_string(),
                time: Some(modified),
                wal_file_name: "000000010000000000000002".to_string(),
            }]
        );
        Ok(())
    }

    #[test]
    fn test_empty_folder_is_normalized() -> Result<()> {
        let folder = MemoryFolder::new();
        assert!(matches!(get_backups(&folder), Err(CatalogError::NoBackupsFound)));
        assert!(list_backups(&folder, &PostgresMetaInteractor::new())?.is_empty());
        assert!(list_restore_points(&folder, &PostgresMetaInteractor::new())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_storage_failure_passes_through() {
        let err = list_backups(&UnreachableFolder, &PostgresMetaInteractor::new()).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn test_malformed_sentinel_fails_listing() -> Result<()> {
        let folder = MemoryFolder::new();
        folder.put_object(
            &sentinel_name_from_backup("base_000000010000000000000002"),
            Bytes::from_static(b"[1, 2"),
        )?;

        let err = list_backups(&folder, &PostgresMetaInteractor::new()).unwrap_err();
        assert!(matches!(err, CatalogError::Serialization(_)));
        Ok(())
    }

    #[test]
    fn test_join_zero_value_fallback() -> Result<()> {
        let folder = MemoryFolder::new();
        let times = vec![BackupTime {
            backup_name: "orphan".to_string(),
            ..Default::default()
        }];

        let joined = join_with_metadata(
            times.clone(),
            &folder,
            &PostgresMetaInteractor::new(),
            MissingMetadata::ZeroValue,
        )?;
        assert_eq!(joined[0].metadata.backup_name, "orphan");
        assert_eq!(joined[0].metadata.start_time, None);

        let err = join_with_metadata(
            times,
            &folder,
            &PostgresMetaInteractor::new(),
            MissingMetadata::Fail,
        )
        .unwrap_err();
        assert!(err.is_not_found());
        Ok(())
    }
}
