use std::path::PathBuf;
use thiserror::Error;

pub type SheetflatResult<T> = Result<T, SheetflatError>;

#[derive(Error, Debug)]
pub enum SheetflatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Worksheet not found: {0}")]
    WorksheetNotFound(String),

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Row {row} has {found} cells but the header has {expected} columns")]
    ShapeMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{} is outside the allowed destinations: {allowed:?}", path.display())]
    ForbiddenDestination { path: PathBuf, allowed: Vec<PathBuf> },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] polars::prelude::PolarsError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Excel export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Column '{column}' row {row}: cannot convert '{value}'")]
    Coercion {
        column: String,
        row: usize,
        value: String,
    },

    #[error("Column not found in table: {0}")]
    MissingColumn(String),

    #[error("Encoding error: {0}")]
    Encoding(String),
}
