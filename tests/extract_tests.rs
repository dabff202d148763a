//! Workbook extraction tests against real .xlsx files
//!
//! Fixtures are written with rust_xlsxwriter into a temporary directory and
//! read back through calamine, the same way report workbooks are consumed.

use pretty_assertions::assert_eq;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use sheetflat::excel::{read_headers, read_matrix};
use sheetflat::transform::{transform_workbook, ExtractOptions};
use sheetflat::types::{ColumnCase, DataRegion, DatePattern, HeaderRegion, SheetSelector};
use sheetflat::writer::{CsvWriter, ParquetWriter, PathPolicy, TableWriter};
use sheetflat::SheetflatError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════
// FIXTURES
// ═══════════════════════════════════════════════════════════════════════════

/// Two sheets: a cover page, then a crime bulletin with a two-row merged
/// header, two data rows, three blank rows and a footnote.
fn bulletin(dir: &Path) -> PathBuf {
    let path = dir.join("Bulletin-2022.xlsx");
    let mut workbook = Workbook::new();

    let cover = workbook.add_worksheet();
    cover.set_name("Resumo").unwrap();
    cover.write_string(0, 0, "Secretaria da Segurança Pública").unwrap();

    let sheet = workbook.add_worksheet();
    sheet.set_name("2022").unwrap();
    sheet.write_string(0, 0, "Indicadores Criminais - 2022").unwrap();

    sheet.write_string(2, 0, "Município").unwrap();
    sheet.write_string(2, 1, "Furtos").unwrap();
    sheet.write_string(2, 3, "Roubos").unwrap();
    sheet.write_string(3, 1, "Total").unwrap();
    sheet.write_string(3, 2, "Veículos").unwrap();
    sheet.write_string(3, 3, "Total").unwrap();
    sheet.write_string(3, 4, "Veículos").unwrap();

    let rows: [(&str, [f64; 4]); 2] = [
        ("Porto Alegre", [1200.0, 300.0, 500.0, 80.0]),
        ("Canoas", [450.0, 0.0, 120.0, 15.0]),
    ];
    for (offset, (city, values)) in rows.iter().enumerate() {
        let row = 4 + offset as u32;
        sheet.write_string(row, 0, *city).unwrap();
        for (col, value) in values.iter().enumerate() {
            sheet.write_number(row, col as u16 + 1, *value).unwrap();
        }
    }
    sheet.write_string(9, 0, "Fonte: SSP/RS").unwrap();

    workbook.save(&path).unwrap();
    path
}

fn bulletin_options() -> ExtractOptions {
    ExtractOptions::new(HeaderRegion::new(3, 4, 1).unwrap(), DataRegion::new(5).unwrap())
        .with_sheet(SheetSelector::from("2022"))
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// TRANSFORMATION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_transform_bulletin() {
    let dir = TempDir::new().unwrap();
    let path = bulletin(dir.path());

    let extraction = transform_workbook(&path, &bulletin_options()).unwrap();

    assert_eq!(extraction.sheet_name, "2022");
    assert_eq!(
        extraction.table.columns(),
        strings(&[
            "municipio",
            "furtos_total",
            "furtos_veiculos",
            "roubos_total",
            "roubos_veiculos"
        ])
        .as_slice()
    );
    // The footnote after the blank rows is not data; zero reads as empty
    assert_eq!(
        extraction.table.rows(),
        &[
            strings(&["Porto Alegre", "1200", "300", "500", "80"]),
            strings(&["Canoas", "450", "", "120", "15"]),
        ]
    );
}

#[test]
fn test_positional_sheet_reports_real_name() {
    let dir = TempDir::new().unwrap();
    let path = bulletin(dir.path());

    let options = bulletin_options().with_sheet(SheetSelector::from("1"));
    let extraction = transform_workbook(&path, &options).unwrap();
    assert_eq!(extraction.sheet_name, "2022");

    let options = bulletin_options().with_sheet(SheetSelector::Position(1));
    assert_eq!(transform_workbook(&path, &options).unwrap().sheet_name, "2022");
}

#[test]
fn test_first_sheet_by_default() {
    let dir = TempDir::new().unwrap();
    let path = bulletin(dir.path());

    let region = HeaderRegion::new(1, 1, 0).unwrap();
    let (columns, sheet) =
        read_headers(&path, &SheetSelector::First, &region, &DatePattern::default()).unwrap();

    assert_eq!(sheet, "Resumo");
    assert_eq!(columns, strings(&["secretaria_da_seguranca_publica"]));
}

#[test]
fn test_unknown_sheet() {
    let dir = TempDir::new().unwrap();
    let path = bulletin(dir.path());

    let options = bulletin_options().with_sheet(SheetSelector::from("2031"));
    assert!(matches!(
        transform_workbook(&path, &options),
        Err(SheetflatError::WorksheetNotFound(_))
    ));
}

#[test]
fn test_header_window_must_match_data_width() {
    let dir = TempDir::new().unwrap();
    let path = bulletin(dir.path());

    let header = HeaderRegion::new(3, 4, 1)
        .unwrap()
        .with_columns(None, Some(3));
    let options = ExtractOptions::new(header, DataRegion::new(5).unwrap())
        .with_sheet(SheetSelector::from("2022"));

    assert!(matches!(
        transform_workbook(&path, &options),
        Err(SheetflatError::ShapeMismatch {
            row: 0,
            expected: 3,
            found: 5
        })
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// HEADERS AND MATRIX
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_date_headers_and_preserved_case() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("monthly.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    sheet.write_string(0, 0, "Município").unwrap();
    sheet
        .write_datetime_with_format(0, 1, &ExcelDateTime::from_ymd(2022, 1, 31).unwrap(), &date_format)
        .unwrap();
    workbook.save(&path).unwrap();

    let lower = HeaderRegion::new(1, 1, 0).unwrap();
    let (columns, _) = read_headers(&path, &SheetSelector::First, &lower, &DatePattern::default()).unwrap();
    assert_eq!(columns, strings(&["municipio", "31012022_000000"]));

    let preserved = lower.with_case(ColumnCase::Preserve);
    let month = DatePattern::new("%B %Y").unwrap();
    let (columns, _) = read_headers(&path, &SheetSelector::First, &preserved, &month).unwrap();
    assert_eq!(columns, strings(&["Municipio", "January_2022"]));
}

#[test]
fn test_read_matrix_stops_at_blank_run() {
    let dir = TempDir::new().unwrap();
    let path = bulletin(dir.path());

    let region = DataRegion::new(5).unwrap().with_columns(Some(1), Some(2));
    let (rows, sheet) = read_matrix(&path, &SheetSelector::from("2022"), &region).unwrap();

    assert_eq!(sheet, "2022");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].len(), 2);
    assert_eq!(rows[1][0], calamine::Data::String("Canoas".to_string()));
}

// ═══════════════════════════════════════════════════════════════════════════
// END TO END
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_bulletin_to_csv_and_parquet() {
    let dir = TempDir::new().unwrap();
    let path = bulletin(dir.path());
    let policy = PathPolicy::new([dir.path()]).unwrap();

    let extraction = transform_workbook(&path, &bulletin_options()).unwrap();

    let csv = dir.path().join("out/2022/dados.csv");
    CsvWriter::new(policy.clone())
        .write(&extraction.table, &csv)
        .unwrap();
    assert_eq!(
        fs::read_to_string(&csv).unwrap(),
        "municipio,furtos_total,furtos_veiculos,roubos_total,roubos_veiculos\n\
         Porto Alegre,1200,300,500,80\n\
         Canoas,450,,120,15\n"
    );

    let parquet = dir.path().join("out/2022/dados.parquet");
    ParquetWriter::new(policy)
        .write(&extraction.table, &parquet)
        .unwrap();
    assert!(parquet.metadata().unwrap().len() > 0);
}

#[test]
fn test_forbidden_destination_leaves_no_file() {
    let dir = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    let path = bulletin(dir.path());
    let policy = PathPolicy::new([dir.path().join("exports")]).unwrap();

    let extraction = transform_workbook(&path, &bulletin_options()).unwrap();
    let target = elsewhere.path().join("dados.csv");

    assert!(matches!(
        CsvWriter::new(policy).write(&extraction.table, &target),
        Err(SheetflatError::ForbiddenDestination { .. })
    ));
    assert!(!target.exists());
}
