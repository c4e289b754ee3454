//! Blob storage abstraction.
//!
//! A [`Folder`] is an addressable container of objects keyed by name. The
//! backups of one archive and their sentinels live in a single sub-folder of
//! the storage root (see [`BASE_BACKUP_PATH`]).

pub mod local;
pub mod memory;

pub use local::FsFolder;
pub use memory::MemoryFolder;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::Result;

/// Sub-folder holding base backups, their sentinels and restore points
pub const BASE_BACKUP_PATH: &str = "basebackups_005/";

/// An object directly inside a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Key relative to the folder
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// Last modified timestamp reported by the storage
    pub last_modified: DateTime<Utc>,
}

/// Storage folder operations
pub trait Folder: Send + Sync {
    /// Location of this folder, for log messages
    fn path(&self) -> &str;

    /// Read an object. Missing keys yield `CatalogError::NotFound`.
    fn get_object(&self, key: &str) -> Result<Bytes>;

    /// Create or overwrite an object unconditionally
    fn put_object(&self, key: &str, content: Bytes) -> Result<()>;

    /// Objects directly inside this folder (sub-folders are not descended)
    fn list_objects(&self) -> Result<Vec<ObjectInfo>>;

    /// Folder nested under this one
    fn sub_folder(&self, path: &str) -> Box<dyn Folder>;
}

/// Joins a folder prefix and a relative path, keeping exactly one `/`
/// between segments and a trailing `/` on the result.
pub(crate) fn join_prefix(prefix: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        return prefix.to_string();
    }
    format!("{}{}/", prefix, path)
}
