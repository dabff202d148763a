//! Assembled tables: named columns over rows of text

use crate::error::{SheetflatError, SheetflatResult};
use crate::excel::cell_text;
use crate::sanitize::sanitize;
use calamine::Data;
use serde::Serialize;

/// Rows of text values under an ordered list of column names.
///
/// Every row has exactly one value per column. Column names are positional
/// and may repeat.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from text rows, rejecting rows of the wrong width
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> SheetflatResult<Self> {
        check_widths(columns.len(), rows.iter().map(Vec::len))?;
        Ok(Self { columns, rows })
    }

    /// Zip extracted rows with header names, converting every cell to text
    pub fn assemble(rows: &[Vec<Data>], columns: Vec<String>) -> SheetflatResult<Self> {
        check_widths(columns.len(), rows.iter().map(Vec::len))?;
        let rows = rows
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column called `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of the first column called `name`
    pub fn column_values(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[index].as_str()).collect())
    }

    /// Column names passed through the identifier sanitizer
    pub fn sanitized_columns(&self) -> Vec<String> {
        self.columns.iter().map(|c| sanitize(c)).collect()
    }

    /// Same rows under sanitized column names
    pub fn with_sanitized_columns(mut self) -> Self {
        self.columns = self.sanitized_columns();
        self
    }

    /// Remove the right-most column from the header and every row
    pub fn drop_last_column(&mut self) -> Option<String> {
        let name = self.columns.pop()?;
        for row in &mut self.rows {
            row.pop();
        }
        Some(name)
    }
}

fn check_widths(expected: usize, widths: impl Iterator<Item = usize>) -> SheetflatResult<()> {
    for (row, found) in widths.enumerate() {
        if found != expected {
            return Err(SheetflatError::ShapeMismatch {
                row,
                expected,
                found,
            });
        }
    }
    Ok(())
}
