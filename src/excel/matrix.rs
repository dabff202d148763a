//! Data matrix extraction with blank-run end-of-data detection

use super::cell::is_falsy;
use super::importer::{WorkbookSource, Worksheet};
use crate::error::SheetflatResult;
use crate::types::{DataRegion, SheetSelector};
use calamine::Data;
use tracing::debug;

/// The data ends right before this many consecutive fully-empty rows
pub const BLANK_RUN_LIMIT: usize = 3;

/// Read the data region into uniform rows, stopping at a run of blank rows
pub fn extract_matrix<W: WorkbookSource + ?Sized>(
    workbook: &mut W,
    selector: &SheetSelector,
    region: &DataRegion,
) -> SheetflatResult<(Vec<Vec<Data>>, String)> {
    region.validate()?;
    let sheet = workbook.resolve(selector)?;
    let rows = matrix_from_sheet(&sheet, region);
    debug!(
        "Sheet '{}': {} data row(s) from row {}",
        sheet.name(),
        rows.len(),
        region.start_row
    );
    Ok((rows, sheet.into_name()))
}

/// Rows of an already resolved worksheet; falsy cells become empty strings
pub fn matrix_from_sheet(sheet: &Worksheet, region: &DataRegion) -> Vec<Vec<Data>> {
    let end_col = region.end_col.unwrap_or_else(|| sheet.last_col());
    let mut rows = Vec::new();
    let mut blank_run = 0;

    for row in region.start_row..=sheet.last_row() {
        let mut empty_cells = 0;
        let cells: Vec<Data> = (region.start_col..=end_col)
            .map(|col| {
                let cell = sheet.cell(row, col);
                if is_falsy(cell) {
                    empty_cells += 1;
                    Data::String(String::new())
                } else {
                    cell.clone()
                }
            })
            .collect();

        blank_run = if empty_cells == cells.len() { blank_run + 1 } else { 0 };
        if blank_run >= BLANK_RUN_LIMIT {
            break;
        }
        rows.push(cells);
    }

    while rows.last().is_some_and(|row| row.iter().all(is_falsy)) {
        rows.pop();
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SheetflatError;
    use crate::excel::MemoryWorkbook;
    use pretty_assertions::assert_eq;

    fn int_rows(rows: &[&[i64]]) -> Vec<Vec<Data>> {
        rows.iter()
            .map(|row| row.iter().map(|v| Data::Int(*v)).collect())
            .collect()
    }

    fn extract(rows: Vec<Vec<Data>>, region: DataRegion) -> Vec<Vec<Data>> {
        let mut workbook = MemoryWorkbook::new().with_sheet("Dados", rows);
        extract_matrix(&mut workbook, &SheetSelector::First, &region)
            .unwrap()
            .0
    }

    fn empty() -> Data {
        Data::String(String::new())
    }

    #[test]
    fn test_stops_before_three_blank_rows() {
        let rows = vec![
            vec![Data::Int(1)],
            vec![Data::Int(2)],
            vec![],
            vec![],
            vec![],
            vec![Data::Int(3)],
        ];
        assert_eq!(
            extract(rows, DataRegion::new(1).unwrap()),
            int_rows(&[&[1], &[2]])
        );
    }

    #[test]
    fn test_keeps_short_interior_blank_runs() {
        let rows = vec![
            vec![Data::Int(1)],
            vec![],
            vec![],
            vec![Data::Int(2)],
            vec![],
            vec![Data::Int(3)],
        ];
        assert_eq!(
            extract(rows, DataRegion::new(1).unwrap()),
            vec![
                vec![Data::Int(1)],
                vec![empty()],
                vec![empty()],
                vec![Data::Int(2)],
                vec![empty()],
                vec![Data::Int(3)],
            ]
        );
    }

    #[test]
    fn test_trims_trailing_blank_rows_at_sheet_end() {
        let rows = vec![
            vec![Data::Int(1), Data::Int(1)],
            vec![Data::Int(2), Data::Empty],
            vec![Data::Empty, Data::Empty],
            vec![Data::Empty, Data::String("x".to_string())],
        ];
        let region = DataRegion::new(1).unwrap().with_columns(Some(1), Some(1));
        assert_eq!(extract(rows, region), int_rows(&[&[1], &[2]]));
    }

    #[test]
    fn test_normalizes_falsy_cells() {
        let rows = vec![vec![
            Data::String("Porto Alegre".to_string()),
            Data::Empty,
            Data::Int(0),
            Data::Float(12.5),
            Data::Bool(false),
        ]];
        assert_eq!(
            extract(rows, DataRegion::new(1).unwrap()),
            vec![vec![
                Data::String("Porto Alegre".to_string()),
                empty(),
                empty(),
                Data::Float(12.5),
                empty(),
            ]]
        );
    }

    #[test]
    fn test_starts_at_row_and_column() {
        let rows = vec![
            vec![Data::String("header".to_string()), Data::Empty],
            vec![Data::String("skip".to_string()), Data::Int(10)],
            vec![Data::String("skip".to_string()), Data::Int(20)],
        ];
        let region = DataRegion::new(2).unwrap().with_columns(Some(2), None);
        assert_eq!(extract(rows, region), int_rows(&[&[10], &[20]]));
    }

    #[test]
    fn test_fixed_width_pads_past_sheet_edge() {
        let rows = vec![vec![Data::Int(1)]];
        let region = DataRegion::new(1).unwrap().with_columns(None, Some(3));
        assert_eq!(
            extract(rows, region),
            vec![vec![Data::Int(1), empty(), empty()]]
        );
    }

    #[test]
    fn test_start_below_sheet_end_is_empty() {
        let rows = int_rows(&[&[1], &[2]]);
        assert!(extract(rows, DataRegion::new(10).unwrap()).is_empty());
    }

    #[test]
    fn test_unknown_sheet() {
        let mut workbook = MemoryWorkbook::new().with_sheet("Dados", int_rows(&[&[1]]));
        let result = extract_matrix(
            &mut workbook,
            &SheetSelector::Named("Resumo".to_string()),
            &DataRegion::new(1).unwrap(),
        );
        assert!(matches!(result, Err(SheetflatError::WorksheetNotFound(_))));
    }
}
