//! Merge delimited exports into a single table

use crate::error::{SheetflatError, SheetflatResult};
use crate::table::Table;
use ::csv::ReaderBuilder;
use encoding_rs::Encoding;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub const DEFAULT_DELIMITER: u8 = b';';
pub const DEFAULT_ENCODING: &str = "cp1252";

/// Concatenate delimited files into one table.
///
/// Each file is decoded with the encoding named by `encoding_label` and its
/// first record is taken as the header. The result has the union of every
/// header in first-seen order; cells a file does not provide are empty. A
/// name repeated within one header gets a `_2`, `_3`, ... suffix so that no
/// field is dropped.
pub fn merge_delimited(
    files: &[PathBuf],
    delimiter: u8,
    encoding_label: &str,
) -> SheetflatResult<Table> {
    let encoding = Encoding::for_label(encoding_label.trim().as_bytes())
        .ok_or_else(|| SheetflatError::Encoding(format!("Unknown encoding label '{}'", encoding_label)))?;

    let mut columns: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for file in files {
        let bytes = fs::read(file)?;
        let (text, used, had_errors) = encoding.decode(&bytes);
        if had_errors {
            warn!(
                "{} has bytes that are not valid {}; replaced",
                file.display(),
                used.name()
            );
        }

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(text.as_bytes());

        let mut seen: HashSet<String> = HashSet::new();
        let mapping: Vec<usize> = reader
            .headers()?
            .iter()
            .map(|name| {
                let mut key = name.to_string();
                let mut occurrence = 1;
                while !seen.insert(key.clone()) {
                    occurrence += 1;
                    key = format!("{}_{}", name, occurrence);
                }
                if occurrence > 1 {
                    debug!("Repeated column '{}' in {} read as '{}'", name, file.display(), key);
                }
                *positions.entry(key.clone()).or_insert_with(|| {
                    columns.push(key);
                    columns.len() - 1
                })
            })
            .collect();

        let before = rows.len();
        for record in reader.records() {
            let record = record?;
            let mut row = vec![String::new(); columns.len()];
            for (value, &target) in record.iter().zip(&mapping) {
                row[target] = value.to_string();
            }
            rows.push(row);
        }
        debug!("Read {} rows from {}", rows.len() - before, file.display());
    }

    // Rows from earlier files are narrower when later files add columns
    let width = columns.len();
    for row in &mut rows {
        row.resize(width, String::new());
    }

    info!("Merged {} files into {} rows", files.len(), rows.len());
    Table::new(columns, rows)
}
