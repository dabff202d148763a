use super::{PathPolicy, TableWriter};
use crate::error::SheetflatResult;
use crate::table::Table;
use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use std::path::Path;
use tracing::info;

/// UTF-8, comma separated, `"`-quoted, `\n`-terminated text files
#[derive(Debug, Clone)]
pub struct CsvWriter {
    policy: PathPolicy,
}

impl CsvWriter {
    pub fn new(policy: PathPolicy) -> Self {
        Self { policy }
    }
}

impl TableWriter for CsvWriter {
    fn write(&self, table: &Table, destination: &Path) -> SheetflatResult<()> {
        self.policy.prepare(destination)?;

        let mut writer = WriterBuilder::new()
            .delimiter(b',')
            .quote(b'"')
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .from_path(destination)?;

        writer.write_record(table.sanitized_columns())?;
        for row in table.rows() {
            writer.write_record(row)?;
        }
        writer.flush()?;

        info!("Saved {}", destination.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SheetflatError;
    use calamine::Data;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_writes_sanitized_header_and_quoted_rows() {
        let dir = TempDir::new().unwrap();
        let writer = CsvWriter::new(PathPolicy::new([dir.path()]).unwrap());
        let table = Table::new(
            strings(&["Município", "Furtos"]),
            vec![
                strings(&["Porto Alegre", "1200"]),
                strings(&["Santana do Livramento, RS", ""]),
                strings(&["Dom \"Pedrito\"", "7"]),
            ],
        )
        .unwrap();

        let path = dir.path().join("out/2022/dados.csv");
        writer.write(&table, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "Municipio,Furtos\n\
             Porto Alegre,1200\n\
             \"Santana do Livramento, RS\",\n\
             \"Dom \"\"Pedrito\"\"\",7\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let writer = CsvWriter::new(PathPolicy::new([dir.path()]).unwrap());
        let rows = vec![
            vec![Data::String("Canoas, RS".to_string()), Data::Int(2)],
            vec![Data::String("Pelotas".to_string()), Data::Empty],
        ];
        let table = Table::assemble(&rows, strings(&["municipio", "furtos"])).unwrap();

        let path = dir.path().join("round_trip.csv");
        writer.write(&table, &path).unwrap();

        let mut reader = ::csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();

        assert_eq!(headers, strings(&["municipio", "furtos"]));
        assert_eq!(
            rows,
            vec![strings(&["Canoas, RS", "2"]), strings(&["Pelotas", ""])]
        );
    }

    #[test]
    fn test_forbidden_destination_writes_nothing() {
        let allowed = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let writer = CsvWriter::new(PathPolicy::new([allowed.path()]).unwrap());
        let table = Table::new(strings(&["a"]), vec![strings(&["1"])]).unwrap();

        let path = outside.path().join("nested/dados.csv");
        let result = writer.write(&table, &path);

        assert!(matches!(result, Err(SheetflatError::ForbiddenDestination { .. })));
        assert!(!path.exists());
        assert!(!outside.path().join("nested").exists());
    }
}
