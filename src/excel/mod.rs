//! Spreadsheet reading and extraction
//!
//! - Workbook access: calamine-backed files or in-memory grids
//! - Header extraction: multi-row headers → one sanitized name per column
//! - Data matrix extraction: rows until a run of blank rows

mod cell;
pub mod cell_ref;
mod headers;
mod importer;
mod matrix;

pub use cell::{cell_text, header_text, is_falsy, TABLE_DATETIME_FORMAT};
pub use headers::{extract_headers, headers_from_sheet};
pub use importer::{resolve_sheet_name, CalamineWorkbook, MemoryWorkbook, Worksheet, WorkbookSource};
pub use matrix::{extract_matrix, matrix_from_sheet, BLANK_RUN_LIMIT};

use crate::error::SheetflatResult;
use crate::types::{DataRegion, DatePattern, HeaderRegion, SheetSelector};
use calamine::Data;
use std::path::Path;

/// Open `path`, extract its header names and close it again
pub fn read_headers(
    path: &Path,
    selector: &SheetSelector,
    region: &HeaderRegion,
    dates: &DatePattern,
) -> SheetflatResult<(Vec<String>, String)> {
    let mut workbook = CalamineWorkbook::open(path)?;
    extract_headers(&mut workbook, selector, region, dates)
}

/// Open `path`, extract its data matrix and close it again
pub fn read_matrix(
    path: &Path,
    selector: &SheetSelector,
    region: &DataRegion,
) -> SheetflatResult<(Vec<Vec<Data>>, String)> {
    let mut workbook = CalamineWorkbook::open(path)?;
    extract_matrix(&mut workbook, selector, region)
}
