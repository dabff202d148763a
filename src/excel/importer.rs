//! Workbook reading: opening files, resolving worksheets, cell access

use crate::error::{SheetflatError, SheetflatResult};
use crate::types::SheetSelector;
use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

static EMPTY: Data = Data::Empty;

/// A source of worksheets addressed by name
pub trait WorkbookSource {
    /// Sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Cell values of the named sheet
    fn sheet_range(&mut self, name: &str) -> SheetflatResult<Range<Data>>;

    /// Resolve a selector to a worksheet, carrying the sheet's real name
    fn resolve(&mut self, selector: &SheetSelector) -> SheetflatResult<Worksheet> {
        let name = resolve_sheet_name(&self.sheet_names(), selector)?;
        let range = self.sheet_range(&name)?;
        Ok(Worksheet::new(name, range))
    }
}

/// Pick a sheet name: by name first, then by 0-based position, else the first sheet
pub fn resolve_sheet_name(names: &[String], selector: &SheetSelector) -> SheetflatResult<String> {
    match selector {
        SheetSelector::First => names.first().cloned().ok_or_else(|| {
            SheetflatError::WorksheetNotFound("workbook has no worksheets".to_string())
        }),
        SheetSelector::Named(name) => {
            if names.iter().any(|n| n == name) {
                return Ok(name.clone());
            }
            debug!("No sheet named '{}', trying it as a position", name);
            name.trim()
                .parse::<usize>()
                .ok()
                .and_then(|position| names.get(position))
                .cloned()
                .ok_or_else(|| SheetflatError::WorksheetNotFound(name.clone()))
        }
        SheetSelector::Position(position) => names
            .get(*position)
            .cloned()
            .ok_or_else(|| SheetflatError::WorksheetNotFound(format!("#{}", position))),
    }
}

/// One resolved worksheet; rows and columns are 1-based
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    range: Range<Data>,
}

impl Worksheet {
    pub fn new(name: String, range: Range<Data>) -> Self {
        Self { name, range }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn into_name(self) -> String {
        self.name
    }

    /// Value at (row, col); positions outside the used range read as empty
    pub fn cell(&self, row: u32, col: u32) -> &Data {
        if row == 0 || col == 0 {
            return &EMPTY;
        }
        self.range.get_value((row - 1, col - 1)).unwrap_or(&EMPTY)
    }

    /// Last used row, 0 for an empty sheet
    pub fn last_row(&self) -> u32 {
        self.range.end().map_or(0, |(row, _)| row + 1)
    }

    /// Last used column, 0 for an empty sheet
    pub fn last_col(&self) -> u32 {
        self.range.end().map_or(0, |(_, col)| col + 1)
    }
}

/// Workbook file opened read-only through calamine (xlsx, xlsm, xlsb, xls, ods)
pub struct CalamineWorkbook {
    sheets: Sheets<BufReader<File>>,
}

impl CalamineWorkbook {
    pub fn open<P: AsRef<Path>>(path: P) -> SheetflatResult<Self> {
        let path = path.as_ref();
        let sheets = open_workbook_auto(path)?;
        debug!("Opened workbook {}", path.display());
        Ok(Self { sheets })
    }
}

impl WorkbookSource for CalamineWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names().to_vec()
    }

    fn sheet_range(&mut self, name: &str) -> SheetflatResult<Range<Data>> {
        Ok(self.sheets.worksheet_range(name)?)
    }
}

/// Workbook held in memory, built row by row from cell values
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<(String, Range<Data>)>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet whose first row is row 1 and first column is column A
    pub fn with_sheet(mut self, name: impl Into<String>, rows: Vec<Vec<Data>>) -> Self {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);

        let range = if height == 0 || width == 0 {
            Range::empty()
        } else {
            let mut range = Range::new((0, 0), ((height - 1) as u32, (width - 1) as u32));
            for (row, cells) in rows.into_iter().enumerate() {
                for (col, value) in cells.into_iter().enumerate() {
                    range.set_value((row as u32, col as u32), value);
                }
            }
            range
        };

        self.sheets.push((name.into(), range));
        self
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn sheet_range(&mut self, name: &str) -> SheetflatResult<Range<Data>> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, range)| range.clone())
            .ok_or_else(|| SheetflatError::WorksheetNotFound(name.to_string()))
    }
}
