//! Per-engine metadata adapters.
//!
//! Each engine persists its own sentinel shape; the adapters project it into
//! [`GenericMetadata`](crate::metadata::GenericMetadata) and write the two
//! mutable fields back. Everything above this module works only with the
//! generic traits.

pub mod greenplum;
pub mod mongo;
pub mod postgres;
pub mod sqlserver;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::metadata::GenericMetaInteractor;

/// Database engine that produced the backups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    #[default]
    Postgres,
    Mongo,
    Sqlserver,
    Greenplum,
}

impl EngineKind {
    pub fn interactor(self) -> Box<dyn GenericMetaInteractor> {
        match self {
            EngineKind::Postgres => Box::new(postgres::PostgresMetaInteractor::new()),
            EngineKind::Mongo => Box::new(mongo::MongoMetaInteractor::new()),
            EngineKind::Sqlserver => Box::new(sqlserver::SqlServerMetaInteractor::new()),
            EngineKind::Greenplum => Box::new(greenplum::GreenplumMetaInteractor::new()),
        }
    }
}
