//! In-memory storage folder.
//!
//! Clones share the same object map, so a sub-folder and its parent see
//! each other's writes. Used by tests and as a scratch backend.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::{join_prefix, Folder, ObjectInfo};
use crate::{CatalogError, Result};

#[derive(Debug, Clone)]
struct StoredObject {
    content: Bytes,
    last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryFolder {
    objects: Arc<RwLock<BTreeMap<String, StoredObject>>>,
    prefix: String,
}

impl MemoryFolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object with an explicit modification time
    pub fn put_object_at(&self, key: &str, content: Bytes, last_modified: DateTime<Utc>) {
        self.write().insert(
            format!("{}{}", self.prefix, key),
            StoredObject {
                content,
                last_modified,
            },
        );
    }

    // Writers only insert whole entries, so a poisoned map is still usable.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, StoredObject>> {
        self.objects.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, StoredObject>> {
        self.objects.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Folder for MemoryFolder {
    fn path(&self) -> &str {
        &self.prefix
    }

    fn get_object(&self, key: &str) -> Result<Bytes> {
        let full_key = format!("{}{}", self.prefix, key);
        self.read()
            .get(&full_key)
            .map(|object| object.content.clone())
            .ok_or(CatalogError::NotFound(full_key))
    }

    fn put_object(&self, key: &str, content: Bytes) -> Result<()> {
        self.put_object_at(key, content, Utc::now());
        Ok(())
    }

    fn list_objects(&self) -> Result<Vec<ObjectInfo>> {
        let objects = self.read();
        let listed = objects
            .range(self.prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&self.prefix))
            .filter_map(|(key, object)| {
                let name = &key[self.prefix.len()..];
                if name.contains('/') {
                    return None;
                }
                Some(ObjectInfo {
                    name: name.to_string(),
                    size: object.content.len() as u64,
                    last_modified: object.last_modified,
                })
            })
            .collect();
        Ok(listed)
    }

    fn sub_folder(&self, path: &str) -> Box<dyn Folder> {
        Box::new(MemoryFolder {
            objects: Arc::clone(&self.objects),
            prefix: join_prefix(&self.prefix, path),
        })
    }
}
