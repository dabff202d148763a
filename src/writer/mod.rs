//! Table sinks: CSV, Parquet, XLSX and SQLite
//!
//! Every sink checks the destination against a [`PathPolicy`] before touching
//! the filesystem, creates missing parent directories and writes sanitized
//! column names.

mod csv;
mod parquet;
mod sqlite;
mod xlsx;

pub use self::csv::CsvWriter;
pub use self::parquet::ParquetWriter;
pub use self::sqlite::{ColumnMapping, SqlType, SqliteWriter};
pub use self::xlsx::XlsxWriter;

use crate::error::{SheetflatError, SheetflatResult};
use crate::table::Table;
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// A destination a table can be written to
pub trait TableWriter {
    fn write(&self, table: &Table, destination: &Path) -> SheetflatResult<()>;
}

/// Output file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Parquet,
    Xlsx,
    Sqlite,
}

impl OutputFormat {
    /// Guess the format from a destination's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(Self::Csv),
            "parquet" | "pq" => Some(Self::Parquet),
            "xlsx" => Some(Self::Xlsx),
            "db" | "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

/// Build the sink for `format`.
///
/// `name` is the worksheet name for XLSX (optional) and the table name for
/// SQLite (required). `mappings` only applies to SQLite.
pub fn writer_for(
    format: OutputFormat,
    policy: PathPolicy,
    name: Option<&str>,
    mappings: Vec<ColumnMapping>,
) -> SheetflatResult<Box<dyn TableWriter>> {
    Ok(match format {
        OutputFormat::Csv => Box::new(CsvWriter::new(policy)),
        OutputFormat::Parquet => Box::new(ParquetWriter::new(policy)),
        OutputFormat::Xlsx => match name {
            Some(name) => Box::new(XlsxWriter::new(policy).with_sheet_name(name)),
            None => Box::new(XlsxWriter::new(policy)),
        },
        OutputFormat::Sqlite => {
            let table = name.ok_or_else(|| {
                SheetflatError::Config("SQLite output requires a table name".to_string())
            })?;
            Box::new(SqliteWriter::new(policy, table)?.with_mappings(mappings))
        }
    })
}

//==============================================================================
// Destination Allow-list
//==============================================================================

/// Directory prefixes that writes are confined to.
///
/// Comparison is case-insensitive and done on absolute paths with `.` and
/// `..` resolved, one path component at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPolicy {
    allowed: Vec<PathBuf>,
    normalized: Vec<PathBuf>,
}

impl PathPolicy {
    pub fn new<I, P>(allowed: I) -> SheetflatResult<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let allowed: Vec<PathBuf> = allowed.into_iter().map(Into::into).collect();
        if allowed.is_empty() {
            return Err(SheetflatError::Config(
                "At least one allowed destination directory is required".to_string(),
            ));
        }
        if let Some(relative) = allowed.iter().find(|p| !p.is_absolute()) {
            return Err(SheetflatError::Config(format!(
                "Allowed destination must be an absolute path: {}",
                relative.display()
            )));
        }

        let normalized = allowed.iter().map(|p| fold_case(&normalize(p))).collect();
        Ok(Self { allowed, normalized })
    }

    pub fn allowed(&self) -> &[PathBuf] {
        &self.allowed
    }

    /// Accept `destination` or fail with `ForbiddenDestination`
    pub fn check(&self, destination: &Path) -> SheetflatResult<()> {
        let absolute = if destination.is_absolute() {
            destination.to_path_buf()
        } else {
            std::env::current_dir()?.join(destination)
        };
        let candidate = fold_case(&normalize(&absolute));

        if self.normalized.iter().any(|prefix| candidate.starts_with(prefix)) {
            Ok(())
        } else {
            Err(SheetflatError::ForbiddenDestination {
                path: destination.to_path_buf(),
                allowed: self.allowed.clone(),
            })
        }
    }

    /// Check `destination` and create its parent directories
    pub fn prepare(&self, destination: &Path) -> SheetflatResult<()> {
        self.check(destination)?;
        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
                debug!("Ensured directory {}", parent.display());
            }
        }
        Ok(())
    }
}

/// Resolve `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

fn fold_case(path: &Path) -> PathBuf {
    PathBuf::from(path.to_string_lossy().to_lowercase())
}
