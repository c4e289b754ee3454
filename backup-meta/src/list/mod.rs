//! Backup listing pipeline: retrieve, report, sort, render.

pub mod output;
pub mod retrieve;

use std::io::Write;

use crate::metadata::{BackupTimeWithMetadata, GenericMetaFetcher};
use crate::storage::Folder;
use crate::utils::logger::Logging;
use crate::Result;

pub use output::OutputFormat;

/// Message logged when a listing comes back empty
pub const NO_BACKUPS_FOUND: &str = "No backups found";

/// Sort by start time, oldest first. Entries without a start time come
/// first; ties keep their input order.
pub fn sort_backup_time_with_metadata(backups: &mut [BackupTimeWithMetadata]) {
    backups.sort_by(|a, b| a.metadata.start_time.cmp(&b.metadata.start_time));
}

/// Run a listing.
///
/// An empty result is reported through the info logger. A retrieval error
/// goes to `fatal_on_error` and nothing is rendered. Otherwise a non-empty
/// result is sorted and handed to `write_backup_list` exactly once.
pub fn handle_backup_list<G, W>(get_backups: G, write_backup_list: W, logging: Logging<'_>)
where
    G: FnOnce() -> Result<Vec<BackupTimeWithMetadata>>,
    W: FnOnce(&[BackupTimeWithMetadata]),
{
    let (mut backups, err) = match get_backups() {
        Ok(backups) => (backups, None),
        Err(e) => (Vec::new(), Some(e)),
    };

    if backups.is_empty() {
        logging.info_logger.println(NO_BACKUPS_FOUND);
    }

    logging.error_logger.fatal_on_error(err.as_ref());
    if err.is_some() {
        return;
    }

    if !backups.is_empty() {
        sort_backup_time_with_metadata(&mut backups);
        write_backup_list(&backups);
    }
}

fn render_with<'a, W: Write + ?Sized>(
    format: OutputFormat,
    output: &'a mut W,
    logging: Logging<'a>,
) -> impl FnOnce(&[BackupTimeWithMetadata]) + 'a {
    move |backups: &[BackupTimeWithMetadata]| {
        let result = format.write(backups, output);
        logging.error_logger.fatal_on_error(result.err().as_ref());
    }
}

/// List the backups of a backup folder in the given format
pub fn default_handle_backup_list<F, W>(
    folder: &dyn Folder,
    fetcher: &F,
    format: OutputFormat,
    output: &mut W,
    logging: Logging<'_>,
) where
    F: GenericMetaFetcher + ?Sized,
    W: Write + ?Sized,
{
    handle_backup_list(
        || retrieve::list_backups(folder, fetcher),
        render_with(format, output, logging),
        logging,
    );
}

/// List the restore points of a backup folder in the given format
pub fn handle_restore_point_list<F, W>(
    folder: &dyn Folder,
    fetcher: &F,
    format: OutputFormat,
    output: &mut W,
    logging: Logging<'_>,
) where
    F: GenericMetaFetcher + ?Sized,
    W: Write + ?Sized,
{
    handle_backup_list(
        || retrieve::list_restore_points(folder, fetcher),
        render_with(format, output, logging),
        logging,
    );
}
