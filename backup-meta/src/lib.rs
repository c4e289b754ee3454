//! Backup Metadata Catalog
//!
//! Joins the backups found in an archive with the metadata stored in their
//! sentinels, renders the listing, and amends user data and permanence of
//! existing backups.

pub mod config;
pub mod engines;
pub mod list;
pub mod metadata;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use utils::errors::CatalogError;
pub type Result<T> = std::result::Result<T, CatalogError>;
