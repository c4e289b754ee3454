//! Logging configuration using tracing, plus the sinks the list handler
//! reports through.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::CatalogError;

/// Initialize logging with the specified level.
///
/// Log lines go to stderr; stdout is reserved for rendered listings.
pub fn init(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

/// Informational sink for single-line messages
pub trait InfoLogger {
    fn println(&self, msg: &str);
}

/// Error sink. `fatal_on_error` is a no-op for `None`; real implementations
/// log the error and terminate the process.
pub trait ErrorLogger {
    fn fatal_on_error(&self, err: Option<&CatalogError>);
}

/// Pair of sinks handed to the list handler
#[derive(Clone, Copy)]
pub struct Logging<'a> {
    pub info_logger: &'a dyn InfoLogger,
    pub error_logger: &'a dyn ErrorLogger,
}

/// Process logger backed by `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl InfoLogger for TracingLogger {
    fn println(&self, msg: &str) {
        tracing::info!("{}", msg);
    }
}

impl ErrorLogger for TracingLogger {
    fn fatal_on_error(&self, err: Option<&CatalogError>) {
        if let Some(err) = err {
            tracing::error!("{}", err);
            std::process::exit(1);
        }
    }
}

impl TracingLogger {
    pub fn logging(&self) -> Logging<'_> {
        Logging {
            info_logger: self,
            error_logger: self,
        }
    }
}
