//! Workbook → table transformation (headers + data matrix + assembly)

use crate::error::SheetflatResult;
use crate::excel::{headers_from_sheet, matrix_from_sheet, CalamineWorkbook, WorkbookSource};
use crate::table::Table;
use crate::types::{DataRegion, DatePattern, HeaderRegion, SheetSelector};
use std::path::Path;
use tracing::info;

/// Everything needed to locate the header and the data of one worksheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub sheet: SheetSelector,
    pub header: HeaderRegion,
    pub data: DataRegion,
    pub dates: DatePattern,
}

impl ExtractOptions {
    pub fn new(header: HeaderRegion, data: DataRegion) -> Self {
        Self {
            sheet: SheetSelector::First,
            header,
            data,
            dates: DatePattern::default(),
        }
    }

    pub fn with_sheet(mut self, sheet: SheetSelector) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn with_dates(mut self, dates: DatePattern) -> Self {
        self.dates = dates;
        self
    }
}

/// An assembled table and the real name of the sheet it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub table: Table,
    pub sheet_name: String,
}

/// Open a workbook file and turn one of its sheets into a table
pub fn transform_workbook(path: &Path, options: &ExtractOptions) -> SheetflatResult<Extraction> {
    info!("Processing {}", path.display());
    let mut workbook = CalamineWorkbook::open(path)?;
    let extraction = transform_source(&mut workbook, options)?;
    info!(
        "Processed {} (sheet '{}', {} rows x {} columns)",
        path.display(),
        extraction.sheet_name,
        extraction.table.row_count(),
        extraction.table.column_count()
    );
    Ok(extraction)
}

/// Turn one sheet of an open workbook into a table
pub fn transform_source<W: WorkbookSource + ?Sized>(
    workbook: &mut W,
    options: &ExtractOptions,
) -> SheetflatResult<Extraction> {
    options.header.validate()?;
    options.data.validate()?;

    let sheet = workbook.resolve(&options.sheet)?;
    let columns = headers_from_sheet(&sheet, &options.header, &options.dates);
    let rows = matrix_from_sheet(&sheet, &options.data);
    let table = Table::assemble(&rows, columns)?;

    Ok(Extraction {
        table,
        sheet_name: sheet.into_name(),
    })
}
