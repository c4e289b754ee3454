//! SQL Server backup sentinels.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::metadata::sentinel::{modify_backup_sentinel, Backup};
use crate::metadata::timestamp::{to_utc, SentinelTime};
use crate::metadata::{GenericMetaFetcher, GenericMetaSetter, GenericMetadata, IncrementSource};
use crate::storage::Folder;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SentinelDto {
    #[serde(default)]
    pub databases: Vec<String>,
    #[serde(default)]
    pub start_local_time: SentinelTime,
    #[serde(default)]
    pub stop_local_time: SentinelTime,
    #[serde(default)]
    pub is_permanent: bool,
    #[serde(default)]
    pub user_data: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SqlServerMetaInteractor;

impl SqlServerMetaInteractor {
    pub fn new() -> Self {
        Self
    }
}

impl GenericMetaFetcher for SqlServerMetaInteractor {
    fn fetch(&self, backup_name: &str, folder: &dyn Folder) -> Result<GenericMetadata> {
        let sentinel: SentinelDto = Backup::new(folder, backup_name).fetch_sentinel()?;

        // Sizes and host are not recorded in SQL Server sentinels.
        Ok(GenericMetadata {
            backup_name: backup_name.to_string(),
            start_time: to_utc(sentinel.start_local_time),
            finish_time: to_utc(sentinel.stop_local_time),
            is_permanent: sentinel.is_permanent,
            increment_details: IncrementSource::Unsupported,
            user_data: sentinel.user_data,
            ..Default::default()
        })
    }
}

impl GenericMetaSetter for SqlServerMetaInteractor {
    fn set_user_data(&self, backup_name: &str, folder: &dyn Folder, user_data: Value) -> Result<()> {
        modify_backup_sentinel(folder, backup_name, |mut dto: SentinelDto| {
            dto.user_data = user_data;
            dto
        })
    }

    fn set_is_permanent(&self, backup_name: &str, folder: &dyn Folder, is_permanent: bool) -> Result<()> {
        modify_backup_sentinel(folder, backup_name, |mut dto: SentinelDto| {
            dto.is_permanent = is_permanent;
            dto
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::list::output::write_backup_list;
    use crate::metadata::sentinel::sentinel_name_from_backup;
    use crate::metadata::{BackupTime, BackupTimeWithMetadata};
    use crate::storage::MemoryFolder;
    use bytes::Bytes;

    fn store(folder: &MemoryFolder, name: &str, raw: &'static str) {
        folder
            .put_object(&sentinel_name_from_backup(name), Bytes::from_static(raw.as_bytes()))
            .unwrap();
    }

    #[test]
    fn test_round_trip_leaves_times_untouched() -> Result<()> {
        let start = Utc.with_ymd_and_hms(2021, 11, 5, 1, 2, 3).unwrap();
        let stop = Utc.with_ymd_and_hms(2021, 11, 5, 1, 30, 0).unwrap();
        let folder = MemoryFolder::new();
        Backup::new(&folder, "base_20211105T010203Z").upload_sentinel(&SentinelDto {
            databases: vec!["sales".to_string()],
            start_local_time: Some(start.fixed_offset()),
            stop_local_time: Some(stop.fixed_offset()),
            ..Default::default()
        })?;
        let interactor = SqlServerMetaInteractor::new();

        interactor.set_user_data("base_20211105T010203Z", &folder, serde_json::json!([1, 2, 3]))?;
        interactor.set_is_permanent("base_20211105T010203Z", &folder, true)?;

        let metadata = interactor.fetch("base_20211105T010203Z", &folder)?;
        assert_eq!(metadata.backup_name, "base_20211105T010203Z");
        assert_eq!(metadata.start_time, Some(start));
        assert_eq!(metadata.finish_time, Some(stop));
        assert!(metadata.is_permanent);
        assert_eq!(metadata.user_data, serde_json::json!([1, 2, 3]));
        assert_eq!(metadata.hostname, "");

        let sentinel: SentinelDto = Backup::new(&folder, "base_20211105T010203Z").fetch_sentinel()?;
        assert_eq!(sentinel.databases, vec!["sales".to_string()]);
        Ok(())
    }

    #[test]
    fn test_setters_keep_stored_offsets() -> Result<()> {
        let folder = MemoryFolder::new();
        store(
            &folder,
            "b0",
            r#"{"StartLocalTime":"2021-11-05T01:02:03+03:00","StopLocalTime":"2021-11-05T01:30:00.5+03:00"}"#,
        );
        let interactor = SqlServerMetaInteractor::new();

        interactor.set_is_permanent("b0", &folder, true)?;
        interactor.set_user_data("b0", &folder, Value::from("kept"))?;

        let raw: Value = serde_json::from_slice(&folder.get_object(&sentinel_name_from_backup("b0"))?)?;
        assert_eq!(raw["StartLocalTime"], "2021-11-05T01:02:03+03:00");
        assert_eq!(raw["StopLocalTime"], "2021-11-05T01:30:00.500+03:00");
        assert_eq!(raw["IsPermanent"], true);

        let metadata = interactor.fetch("b0", &folder)?;
        assert_eq!(
            metadata.start_time,
            Some(Utc.with_ymd_and_hms(2021, 11, 4, 22, 2, 3).unwrap())
        );
        Ok(())
    }

    #[test]
    fn test_zero_start_time_renders_as_dash() -> Result<()> {
        let folder = MemoryFolder::new();
        store(
            &folder,
            "b0",
            r#"{"StartLocalTime":"0001-01-01T00:00:00Z","StopLocalTime":"0001-01-01T00:00:00Z"}"#,
        );
        let interactor = SqlServerMetaInteractor::new();

        let metadata = interactor.fetch("b0", &folder)?;
        assert_eq!(metadata.start_time, None);
        assert_eq!(metadata.finish_time, None);

        let backups = vec![BackupTimeWithMetadata::new(
            BackupTime {
                backup_name: "b0".to_string(),
                ..Default::default()
            },
            metadata,
        )];
        let mut output = Vec::new();
        write_backup_list(&backups, &mut output)?;
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "name created wal_segment_backup_start\nb0   -       \n"
        );

        interactor.set_is_permanent("b0", &folder, true)?;
        let raw: Value = serde_json::from_slice(&folder.get_object(&sentinel_name_from_backup("b0"))?)?;
        assert_eq!(raw["StartLocalTime"], "0001-01-01T00:00:00Z");
        Ok(())
    }
}
