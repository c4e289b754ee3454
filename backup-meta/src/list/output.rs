//! Listing renderers: JSON, bordered table, and whitespace-aligned text.

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::metadata::BackupTimeWithMetadata;
use crate::Result;

const PRETTY_HEADERS: [&str; 4] = ["#", "NAME", "CREATED", "WAL SEGMENT BACKUP START"];
const PLAIN_HEADERS: [&str; 3] = ["name", "created", "wal_segment_backup_start"];

/// How a listing is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json { pretty: bool },
    Table,
    Plain,
}

impl OutputFormat {
    /// `json` wins over `pretty`; with both set the JSON is indented
    pub fn from_flags(pretty: bool, json: bool) -> Self {
        match (json, pretty) {
            (true, pretty) => OutputFormat::Json { pretty },
            (false, true) => OutputFormat::Table,
            (false, false) => OutputFormat::Plain,
        }
    }

    pub fn write<W: Write + ?Sized>(self, backups: &[BackupTimeWithMetadata], output: &mut W) -> Result<()> {
        match self {
            OutputFormat::Json { pretty } => write_as_json(backups, output, pretty),
            OutputFormat::Table => write_pretty_backup_list(backups, output),
            OutputFormat::Plain => write_backup_list(backups, output),
        }
    }
}

/// `-` for a missing timestamp, RFC 3339 otherwise
pub fn format_time(time: Option<DateTime<Utc>>) -> String {
    match time {
        Some(time) => time.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => "-".to_string(),
    }
}

pub fn write_as_json<T, W>(data: &T, output: &mut W, pretty: bool) -> Result<()>
where
    T: Serialize + ?Sized,
    W: Write + ?Sized,
{
    if pretty {
        serde_json::to_writer_pretty(&mut *output, data)?;
    } else {
        serde_json::to_writer(&mut *output, data)?;
    }
    writeln!(output)?;
    Ok(())
}

/// Bordered table with an index column
pub fn write_pretty_backup_list<W: Write + ?Sized>(backups: &[BackupTimeWithMetadata], output: &mut W) -> Result<()> {
    let rows: Vec<[String; 4]> = backups
        .iter()
        .enumerate()
        .map(|(i, backup)| {
            let [name, created, wal] = display_columns(backup);
            [i.to_string(), name, created, wal]
        })
        .collect();
    let widths = column_widths(&PRETTY_HEADERS, &rows);

    let border = border_line(&widths);
    output.write_all(border.as_bytes())?;
    output.write_all(table_line(&PRETTY_HEADERS, &widths).as_bytes())?;
    output.write_all(border.as_bytes())?;
    for row in &rows {
        output.write_all(table_line(row, &widths).as_bytes())?;
    }
    output.write_all(border.as_bytes())?;
    Ok(())
}

/// Header line plus one line per backup, columns separated by spaces.
/// The last column is left unpadded.
pub fn write_backup_list<W: Write + ?Sized>(backups: &[BackupTimeWithMetadata], output: &mut W) -> Result<()> {
    let rows: Vec<[String; 3]> = backups.iter().map(display_columns).collect();
    let widths = column_widths(&PLAIN_HEADERS, &rows);

    output.write_all(plain_line(&PLAIN_HEADERS, &widths).as_bytes())?;
    for row in &rows {
        output.write_all(plain_line(row, &widths).as_bytes())?;
    }
    Ok(())
}

fn display_columns(backup: &BackupTimeWithMetadata) -> [String; 3] {
    [
        backup.backup_time.backup_name.clone(),
        format_time(backup.metadata.start_time),
        backup.backup_time.wal_file_name.clone(),
    ]
}

fn column_widths<const N: usize>(headers: &[&str; N], rows: &[[String; N]]) -> [usize; N] {
    let mut widths = headers.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

fn border_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn table_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect();
    format!("| {} |\n", padded.join(" | "))
}

fn plain_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let mut line = String::new();
    let last = cells.len().saturating_sub(1);
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i == last {
            line.push_str(cell.as_ref());
        } else {
            line.push_str(&format!("{:<width$} ", cell.as_ref(), width = *width));
        }
    }
    line.push('\n');
    line
}
