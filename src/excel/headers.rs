//! Header extraction: fold a multi-row header region into one name per column

use super::cell::header_text;
use super::importer::{Worksheet, WorkbookSource};
use crate::error::SheetflatResult;
use crate::sanitize::sanitize;
use crate::types::{ColumnCase, DatePattern, HeaderRegion, SheetSelector};
use tracing::debug;

/// Extract column names from `region`, returning them with the resolved sheet name
pub fn extract_headers<W: WorkbookSource + ?Sized>(
    workbook: &mut W,
    selector: &SheetSelector,
    region: &HeaderRegion,
    dates: &DatePattern,
) -> SheetflatResult<(Vec<String>, String)> {
    region.validate()?;
    let sheet = workbook.resolve(selector)?;
    let columns = headers_from_sheet(&sheet, region, dates);
    debug!(
        "Sheet '{}': {} header column(s) from rows {}..={}",
        sheet.name(),
        columns.len(),
        region.start_row,
        region.end_row
    );
    Ok((columns, sheet.into_name()))
}

/// Column names of an already resolved worksheet
pub fn headers_from_sheet(sheet: &Worksheet, region: &HeaderRegion, dates: &DatePattern) -> Vec<String> {
    let end_col = region.end_col.unwrap_or_else(|| sheet.last_col());
    let rows: Vec<Vec<String>> = (0..region.row_count())
        .map(|offset| {
            let row = region.start_row + offset;
            let forward_fill = offset < region.forward_fill_rows;
            let cells = (region.start_col..=end_col).map(|col| header_text(sheet.cell(row, col), dates));
            fill_row(cells, forward_fill)
        })
        .collect();

    fold_columns(&rows, region.case)
}

/// Within a forward-filled row an empty cell repeats the value on its left
fn fill_row(cells: impl Iterator<Item = String>, forward_fill: bool) -> Vec<String> {
    let mut previous = String::new();
    cells
        .map(|text| {
            let value = if forward_fill && text.is_empty() {
                previous.clone()
            } else {
                text
            };
            previous.clone_from(&value);
            value
        })
        .collect()
}

/// Join each column's non-empty entries top to bottom with `_`, then sanitize
fn fold_columns(rows: &[Vec<String>], case: ColumnCase) -> Vec<String> {
    let width = rows.iter().map(Vec::len).min().unwrap_or(0);

    (0..width)
        .map(|col| {
            let joined = rows
                .iter()
                .map(|row| row[col].as_str())
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join("_");
            let name = sanitize(&joined);
            match case {
                ColumnCase::Lower => name.to_ascii_lowercase(),
                ColumnCase::Preserve => name,
            }
        })
        .collect()
}
