//! Sentinel objects: the per-backup metadata record persisted next to
//! each backup, and the fetch-modify-upload helper used by setters.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::storage::Folder;
use crate::utils::errors::{FETCH_FOR_MODIFY_CONTEXT, UPLOAD_MODIFIED_CONTEXT};
use crate::{CatalogError, Result};

/// Suffix of the sentinel object written when a backup completes
pub const SENTINEL_SUFFIX: &str = "_backup_stop_sentinel.json";

/// Storage key of the sentinel for `backup_name`
pub fn sentinel_name_from_backup(backup_name: &str) -> String {
    format!("{}{}", backup_name, SENTINEL_SUFFIX)
}

/// A named backup inside a backup folder
pub struct Backup<'a> {
    folder: &'a dyn Folder,
    name: String,
}

impl<'a> Backup<'a> {
    pub fn new(folder: &'a dyn Folder, name: impl Into<String>) -> Self {
        Self {
            folder,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sentinel_name(&self) -> String {
        sentinel_name_from_backup(&self.name)
    }

    /// Read and deserialize the sentinel into the engine's native shape
    pub fn fetch_sentinel<T: DeserializeOwned>(&self) -> Result<T> {
        let content = self.folder.get_object(&self.sentinel_name())?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// Serialize and store the sentinel, replacing any previous version
    pub fn upload_sentinel<T: Serialize>(&self, sentinel: &T) -> Result<()> {
        let content = serde_json::to_vec(sentinel)?;
        self.folder
            .put_object(&self.sentinel_name(), Bytes::from(content))
    }
}

/// Fetch the sentinel of `backup_name`, apply `modifier`, and upload the
/// result. There is no compare-and-swap: concurrent modifiers of the same
/// backup race and the last upload wins.
pub fn modify_backup_sentinel<T, F>(folder: &dyn Folder, backup_name: &str, modifier: F) -> Result<()>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(T) -> T,
{
    let backup = Backup::new(folder, backup_name);
    let sentinel: T = backup
        .fetch_sentinel()
        .map_err(|e| CatalogError::modify(FETCH_FOR_MODIFY_CONTEXT, e))?;

    let sentinel = modifier(sentinel);

    backup
        .upload_sentinel(&sentinel)
        .map_err(|e| CatalogError::modify(UPLOAD_MODIFIED_CONTEXT, e))?;

    tracing::debug!("Modified sentinel of backup {} in {}", backup.name(), folder.path());
    Ok(())
}
