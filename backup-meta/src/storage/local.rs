//! Storage folder backed by a directory on the local filesystem.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use super::{Folder, ObjectInfo};
use crate::{CatalogError, Result};

#[derive(Debug, Clone)]
pub struct FsFolder {
    root: PathBuf,
    display: String,
}

impl FsFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let display = root.display().to_string();
        Self { root, display }
    }

    /// Path of `key` under this folder. Keys may not climb out of it.
    fn object_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key.trim_start_matches('/'));
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            return Err(CatalogError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl Folder for FsFolder {
    fn path(&self) -> &str {
        &self.display
    }

    fn get_object(&self, key: &str) -> Result<Bytes> {
        let path = self.object_path(key)?;
        match fs::read(&path) {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(CatalogError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn put_object(&self, key: &str, content: Bytes) -> Result<()> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &content)?;
        tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }

    fn list_objects(&self) -> Result<Vec<ObjectInfo>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }

        let mut objects = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let metadata = entry.metadata().map_err(std::io::Error::from)?;
            let last_modified: DateTime<Utc> = metadata.modified()?.into();
            objects.push(ObjectInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                last_modified,
            });
        }
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(objects)
    }

    fn sub_folder(&self, path: &str) -> Box<dyn Folder> {
        let nested: PathBuf = Path::new(path)
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        Box::new(FsFolder::new(self.root.join(nested)))
    }
}
