//! Custom error types for the backup metadata catalog.

use thiserror::Error;

/// Context attached when the sentinel could not be read before a modification
pub const FETCH_FOR_MODIFY_CONTEXT: &str = "failed to fetch the existing backup metadata for modifying";

/// Context attached when the modified sentinel could not be written back
pub const UPLOAD_MODIFIED_CONTEXT: &str = "failed to upload the modified metadata to the storage";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No backups found")]
    NoBackupsFound,

    #[error("No restore points found")]
    NoRestorePointsFound,

    #[error("{context}: {source}")]
    Modify {
        context: &'static str,
        #[source]
        source: Box<CatalogError>,
    },
}

impl CatalogError {
    pub(crate) fn modify(context: &'static str, source: CatalogError) -> Self {
        CatalogError::Modify {
            context,
            source: Box::new(source),
        }
    }

    /// True when the error (or the error it wraps) is a missing object
    pub fn is_not_found(&self) -> bool {
        match self {
            CatalogError::NotFound(_) => true,
            CatalogError::Modify { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// True for the "nothing to list" signals, which are not real failures
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            CatalogError::NoBackupsFound | CatalogError::NoRestorePointsFound
        )
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
