//! Utility modules for the backup metadata catalog.

pub mod errors;
pub mod logger;

pub use errors::{CatalogError, Result};
pub use logger::{ErrorLogger, InfoLogger, Logging, TracingLogger};
