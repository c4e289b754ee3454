//! MongoDB backup sentinels.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::metadata::sentinel::{modify_backup_sentinel, Backup};
use crate::metadata::timestamp::{to_utc, SentinelTime};
use crate::metadata::{GenericMetaFetcher, GenericMetaSetter, GenericMetadata, IncrementSource};
use crate::storage::Folder;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BackupDto {
    #[serde(default)]
    pub backup_name: String,
    #[serde(default)]
    pub backup_type: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub start_local_time: SentinelTime,
    #[serde(default)]
    pub finish_local_time: SentinelTime,
    #[serde(default)]
    pub user_data: Value,
    #[serde(default)]
    pub permanent: bool,
    #[serde(default)]
    pub uncompressed_size: i64,
    #[serde(default)]
    pub compressed_size: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MongoMetaInteractor;

impl MongoMetaInteractor {
    pub fn new() -> Self {
        Self
    }
}

impl GenericMetaFetcher for MongoMetaInteractor {
    fn fetch(&self, backup_name: &str, folder: &dyn Folder) -> Result<GenericMetadata> {
        let backup: BackupDto = Backup::new(folder, backup_name).fetch_sentinel()?;

        Ok(GenericMetadata {
            backup_name: backup_name.to_string(),
            uncompressed_size: backup.uncompressed_size,
            compressed_size: backup.compressed_size,
            hostname: backup.hostname,
            start_time: to_utc(backup.start_local_time),
            finish_time: to_utc(backup.finish_local_time),
            is_permanent: backup.permanent,
            increment_details: IncrementSource::Unsupported,
            user_data: backup.user_data,
        })
    }
}

impl GenericMetaSetter for MongoMetaInteractor {
    fn set_user_data(&self, backup_name: &str, folder: &dyn Folder, user_data: Value) -> Result<()> {
        modify_backup_sentinel(folder, backup_name, |mut dto: BackupDto| {
            dto.user_data = user_data;
            dto
        })
    }

    fn set_is_permanent(&self, backup_name: &str, folder: &dyn Folder, is_permanent: bool) -> Result<()> {
        modify_backup_sentinel(folder, backup_name, |mut dto: BackupDto| {
            dto.permanent = is_permanent;
            dto
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::storage::MemoryFolder;

    fn upload(folder: &MemoryFolder, name: &str, dto: &BackupDto) {
        Backup::new(folder, name).upload_sentinel(dto).unwrap();
    }

    #[test]
    fn test_fetch() -> Result<()> {
        let date = Utc.with_ymd_and_hms(2022, 3, 21, 0, 0, 0).unwrap();
        let folder = MemoryFolder::new();
        upload(
            &folder,
            "test",
            &BackupDto {
                backup_name: "test".to_string(),
                backup_type: "type".to_string(),
                hostname: "hostname".to_string(),
                start_local_time: Some(date.fixed_offset()),
                finish_local_time: Some(date.fixed_offset()),
                user_data: Value::from("Data"),
                permanent: false,
                uncompressed_size: 7_340_032,
                compressed_size: 1_048_576,
                extra: Map::new(),
            },
        );

        let actual = MongoMetaInteractor::new().fetch("test", &folder)?;

        let expected = GenericMetadata {
            backup_name: "test".to_string(),
            uncompressed_size: 7_340_032,
            compressed_size: 1_048_576,
            hostname: "hostname".to_string(),
            start_time: Some(date),
            finish_time: Some(date),
            is_permanent: false,
            increment_details: IncrementSource::Unsupported,
            user_data: Value::from("Data"),
        };
        assert_eq!(actual, expected);
        Ok(())
    }

    #[test]
    fn test_set_is_permanent() -> Result<()> {
        let folder = MemoryFolder::new();
        let start = Utc.with_ymd_and_hms(2023, 7, 1, 12, 0, 0).unwrap();
        upload(
            &folder,
            "test",
            &BackupDto {
                start_local_time: Some(start.fixed_offset()),
                ..Default::default()
            },
        );
        let interactor = MongoMetaInteractor::new();

        interactor.set_is_permanent("test", &folder, true)?;

        let backup = interactor.fetch("test", &folder)?;
        assert!(backup.is_permanent);
        assert_eq!(backup.start_time, Some(start));
        assert_eq!(backup.backup_name, "test");
        Ok(())
    }

    #[test]
    fn test_set_user_data() -> Result<()> {
        let folder = MemoryFolder::new();
        upload(
            &folder,
            "test",
            &BackupDto {
                user_data: Value::from("Old Data"),
                start_local_time: Some(Utc::now().fixed_offset()),
                ..Default::default()
            },
        );
        let interactor = MongoMetaInteractor::new();

        interactor.set_user_data("test", &folder, Value::from("Updated Data"))?;

        let backup = interactor.fetch("test", &folder)?;
        assert_eq!(backup.user_data, Value::from("Updated Data"));
        assert!(!backup.is_permanent);
        Ok(())
    }

    #[test]
    fn test_set_on_missing_backup() {
        let folder = MemoryFolder::new();
        let err = MongoMetaInteractor::new()
            .set_is_permanent("absent", &folder, true)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_set_user_data_keeps_local_offsets() -> Result<()> {
        use crate::metadata::sentinel::sentinel_name_from_backup;

        let folder = MemoryFolder::new();
        folder.put_object(
            &sentinel_name_from_backup("test"),
            bytes::Bytes::from_static(
                br#"{"StartLocalTime":"2022-03-21T09:00:00+09:00","FinishLocalTime":"2022-03-21T09:10:00+09:00"}"#,
            ),
        )?;

        MongoMetaInteractor::new().set_user_data("test", &folder, Value::from("note"))?;

        let raw: Value = serde_json::from_slice(&folder.get_object(&sentinel_name_from_backup("test"))?)?;
        assert_eq!(raw["StartLocalTime"], "2022-03-21T09:00:00+09:00");
        assert_eq!(raw["FinishLocalTime"], "2022-03-21T09:10:00+09:00");
        assert_eq!(raw["UserData"], "note");
        Ok(())
    }
}
