//! Sheetflat - flatten spreadsheet reports into tables
//!
//! Government and business reports often arrive as workbooks with a title
//! block, multi-row merged headers and data followed by footnotes. This
//! library reads a header region and a data region from one worksheet,
//! derives safe column names, and writes the resulting table to CSV,
//! Parquet, XLSX or SQLite, confined to an allow-list of directories.
//!
//! # Features
//!
//! - Multi-row headers with left-to-right forward fill for merged cells
//! - Column names transliterated to ASCII identifiers
//! - Data extraction that stops after a run of blank rows
//! - Sheets chosen by name or by position
//! - YAML job files for batch runs
//! - Merging of legacy delimited exports (cp1252 and friends)
//!
//! # Example
//!
//! ```no_run
//! use sheetflat::transform::{transform_workbook, ExtractOptions};
//! use sheetflat::types::{DataRegion, HeaderRegion};
//! use sheetflat::writer::{CsvWriter, PathPolicy, TableWriter};
//! use std::path::Path;
//!
//! let options = ExtractOptions::new(HeaderRegion::new(12, 12, 0)?, DataRegion::new(13)?);
//! let extraction = transform_workbook(Path::new("bulletin-2022.xlsx"), &options)?;
//!
//! let writer = CsvWriter::new(PathPolicy::new(["/tmp/"])?);
//! writer.write(&extraction.table, Path::new("/tmp/out/dados.csv"))?;
//! # Ok::<(), sheetflat::error::SheetflatError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod excel;
pub mod merge;
pub mod runner;
pub mod sanitize;
pub mod table;
pub mod transform;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use error::{SheetflatError, SheetflatResult};
pub use excel::{read_headers, read_matrix};
pub use sanitize::sanitize;
pub use table::Table;
pub use transform::{transform_workbook, ExtractOptions, Extraction};
pub use types::{ColumnCase, DataRegion, DatePattern, HeaderRegion, SheetSelector};
