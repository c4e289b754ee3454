//! backup-meta - Main entry point
//!
//! Lists backups and restore points of an archive and amends backup metadata.

use anyhow::Result;
use backup_meta::engines::greenplum::RestorePointMetaFetcher;
use backup_meta::engines::EngineKind;
use backup_meta::list::{self, OutputFormat};
use backup_meta::storage::{Folder, FsFolder};
use backup_meta::utils::{self, TracingLogger};
use backup_meta::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Archive root directory (overrides config)
    #[arg(short, long, value_name = "DIR")]
    storage: Option<PathBuf>,

    /// Engine that produced the backups (overrides config)
    #[arg(short, long, value_enum)]
    engine: Option<EngineKind>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints available backups
    BackupList {
        /// Prints more readable output
        #[arg(long)]
        pretty: bool,

        /// Prints output in json format
        #[arg(long)]
        json: bool,
    },

    /// Prints available restore points
    RestorePointList {
        /// Prints more readable output
        #[arg(long)]
        pretty: bool,

        /// Prints output in json format
        #[arg(long)]
        json: bool,
    },

    /// Marks a backup permanent, so retention keeps it
    BackupMark {
        /// Name of the backup
        name: String,

        /// Removes the permanent mark instead
        #[arg(short, long)]
        impermanent: bool,
    },

    /// Replaces the user data attached to a backup
    SetUserData {
        /// Name of the backup
        name: String,

        /// New user data; parsed as JSON, stored as a string otherwise
        user_data: String,
    },
}

fn parse_user_data(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = if let Some(config_path) = args.config.as_deref() {
        Config::from_file(config_path)?
    } else {
        Config::default()
    };

    // Initialize logging
    let log_level = args.log_level.as_deref().unwrap_or(&config.log.level);
    utils::logger::init(log_level)?;

    let storage_root = args.storage.unwrap_or(config.storage.path);
    let engine = args.engine.unwrap_or(config.engine.kind);
    let root = FsFolder::new(&storage_root);
    let folder = root.sub_folder(&config.storage.backup_path);

    tracing::debug!("Using {:?} metadata in {}", engine, folder.path());

    let logger = TracingLogger;
    let stdout = std::io::stdout();

    match args.command {
        Command::BackupList { pretty, json } => {
            let interactor = engine.interactor();
            list::default_handle_backup_list(
                &*folder,
                &*interactor,
                OutputFormat::from_flags(pretty, json),
                &mut stdout.lock(),
                logger.logging(),
            );
        }
        Command::RestorePointList { pretty, json } => {
            list::handle_restore_point_list(
                &*folder,
                &RestorePointMetaFetcher::new(),
                OutputFormat::from_flags(pretty, json),
                &mut stdout.lock(),
                logger.logging(),
            );
        }
        Command::BackupMark { name, impermanent } => {
            engine
                .interactor()
                .set_is_permanent(&name, &*folder, !impermanent)?;
            tracing::info!(
                "Backup {} marked as {}",
                name,
                if impermanent { "impermanent" } else { "permanent" }
            );
        }
        Command::SetUserData { name, user_data } => {
            engine
                .interactor()
                .set_user_data(&name, &*folder, parse_user_data(&user_data))?;
            tracing::info!("User data of backup {} updated", name);
        }
    }

    Ok(())
}
