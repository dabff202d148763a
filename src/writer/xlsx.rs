use super::{PathPolicy, TableWriter};
use crate::error::SheetflatResult;
use crate::table::Table;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::info;

/// Single-sheet .xlsx files with a bold header row and text cells
#[derive(Debug, Clone)]
pub struct XlsxWriter {
    policy: PathPolicy,
    sheet_name: Option<String>,
}

impl XlsxWriter {
    pub fn new(policy: PathPolicy) -> Self {
        Self {
            policy,
            sheet_name: None,
        }
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    fn write_table(&self, worksheet: &mut Worksheet, table: &Table) -> SheetflatResult<()> {
        if let Some(name) = &self.sheet_name {
            worksheet.set_name(name)?;
        }

        // Header row (row 0)
        let bold = Format::new().set_bold();
        for (col_idx, col_name) in table.sanitized_columns().iter().enumerate() {
            worksheet.write_string_with_format(0, column(col_idx)?, col_name, &bold)?;
        }

        // Data rows start at row 1; empty cells stay blank
        for (row_idx, row) in table.rows().iter().enumerate() {
            let excel_row = u32::try_from(row_idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            for (col_idx, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    worksheet.write_string(excel_row, column(col_idx)?, value)?;
                }
            }
        }

        Ok(())
    }
}

fn column(index: usize) -> Result<u16, XlsxError> {
    u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

impl TableWriter for XlsxWriter {
    fn write(&self, table: &Table, destination: &Path) -> SheetflatResult<()> {
        self.policy.prepare(destination)?;

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        self.write_table(worksheet, table)?;
        workbook.save(destination)?;

        info!("Saved {}", destination.display());
        Ok(())
    }
}
