use super::{PathPolicy, TableWriter};
use crate::error::{SheetflatError, SheetflatResult};
use crate::table::Table;
use polars::prelude::{Column, DataFrame, ParquetWriter as FrameWriter, PolarsError};
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

/// Parquet files with one UTF-8 column per table column.
///
/// When the frame cannot be built or written because of its columns
/// (duplicate names, shape or schema mismatch) the last column is dropped
/// and the write is tried once more.
#[derive(Debug, Clone)]
pub struct ParquetWriter {
    policy: PathPolicy,
}

impl ParquetWriter {
    pub fn new(policy: PathPolicy) -> Self {
        Self { policy }
    }
}

impl TableWriter for ParquetWriter {
    fn write(&self, table: &Table, destination: &Path) -> SheetflatResult<()> {
        self.policy.prepare(destination)?;

        let mut table = table.clone().with_sanitized_columns();
        match write_frame(&table, destination) {
            Err(err) if is_column_incompatibility(&err) => {
                let dropped = table.drop_last_column();
                warn!(
                    "Parquet write of {} failed ({}); retrying without last column {:?}",
                    destination.display(),
                    err,
                    dropped.unwrap_or_default()
                );
                write_frame(&table, destination)?;
            }
            other => other?,
        }

        info!("Saved {}", destination.display());
        Ok(())
    }
}

fn write_frame(table: &Table, destination: &Path) -> SheetflatResult<()> {
    let columns = table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let values: Vec<&str> = table.rows().iter().map(|row| row[index].as_str()).collect();
            Column::new(name.as_str().into(), values)
        })
        .collect();
    let mut frame = DataFrame::new(columns)?;

    let file = File::create(destination)?;
    FrameWriter::new(file).finish(&mut frame)?;
    Ok(())
}

fn is_column_incompatibility(err: &SheetflatError) -> bool {
    matches!(
        err,
        SheetflatError::Parquet(
            PolarsError::Duplicate(_) | PolarsError::ShapeMismatch(_) | PolarsError::SchemaMismatch(_)
        )
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{ParquetReader, SerReader};
    use tempfile::TempDir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn read_back(path: &Path) -> DataFrame {
        ParquetReader::new(File::open(path).unwrap()).finish().unwrap()
    }

    #[test]
    fn test_writes_string_columns() {
        let dir = TempDir::new().unwrap();
        let writer = ParquetWriter::new(PathPolicy::new([dir.path()]).unwrap());
        let table = Table::new(
            strings(&["Município", "Furtos"]),
            vec![strings(&["Canoas", ""]), strings(&["Porto Alegre", "1200"])],
        )
        .unwrap();

        let path = dir.path().join("rs/2022/dados.parquet");
        writer.write(&table, &path).unwrap();

        let frame = read_back(&path);
        assert_eq!(frame.shape(), (2, 2));
        let names: Vec<String> = frame.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, strings(&["Municipio", "Furtos"]));
    }

    #[test]
    fn test_duplicate_last_column_is_dropped() {
        let dir = TempDir::new().unwrap();
        let writer = ParquetWriter::new(PathPolicy::new([dir.path()]).unwrap());
        let table = Table::new(
            strings(&["municipio", "total", "total"]),
            vec![strings(&["Canoas", "1", "2"])],
        )
        .unwrap();

        let path = dir.path().join("dados.parquet");
        writer.write(&table, &path).unwrap();

        let frame = read_back(&path);
        assert_eq!(frame.shape(), (1, 2));
    }

    #[test]
    fn test_gives_up_after_one_retry() {
        let dir = TempDir::new().unwrap();
        let writer = ParquetWriter::new(PathPolicy::new([dir.path()]).unwrap());
        let table = Table::new(
            strings(&["x", "x", "x"]),
            vec![strings(&["1", "2", "3"])],
        )
        .unwrap();

        let result = writer.write(&table, &dir.path().join("dados.parquet"));
        assert!(matches!(
            result,
            Err(SheetflatError::Parquet(PolarsError::Duplicate(_)))
        ));
    }

    #[test]
    fn test_rejects_forbidden_destination() {
        let allowed = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let writer = ParquetWriter::new(PathPolicy::new([allowed.path()]).unwrap());
        let table = Table::new(strings(&["a"]), vec![strings(&["1"])]).unwrap();

        let path = outside.path().join("dados.parquet");
        assert!(matches!(
            writer.write(&table, &path),
            Err(SheetflatError::ForbiddenDestination { .. })
        ));
        assert!(!path.exists());
    }
}
