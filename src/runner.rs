//! Execute the jobs of a loaded [`Config`]

use crate::config::{Config, OutputConfig};
use crate::error::SheetflatResult;
use crate::excel::CalamineWorkbook;
use crate::transform::transform_source;
use crate::writer::{writer_for, PathPolicy, TableWriter};
use std::path::PathBuf;
use tracing::info;

/// One table written to one destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutput {
    pub workbook: PathBuf,
    pub sheet_name: String,
    pub destination: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// What a run produced, in the order it was written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub outputs: Vec<WrittenOutput>,
}

impl RunReport {
    pub fn tables_written(&self) -> usize {
        self.outputs.len()
    }

    pub fn rows_written(&self) -> usize {
        self.outputs.iter().map(|o| o.rows).sum()
    }
}

/// Run every job for every workbook and sheet, stopping at the first error
pub fn run_config(config: &Config) -> SheetflatResult<RunReport> {
    let policy = config.policy()?;
    let mut report = RunReport::default();

    for (index, job) in config.jobs.iter().enumerate() {
        info!("Job {}: {} workbook(s)", index + 1, job.workbooks.len());

        for workbook in &job.workbooks {
            let path = config.workbook_path(workbook);
            info!("Processing {}", path.display());
            let mut source = CalamineWorkbook::open(&path)?;

            for selector in job.selectors() {
                let extraction = transform_source(&mut source, &job.extract_options(selector)?)?;
                info!(
                    "Sheet '{}': {} rows x {} columns",
                    extraction.sheet_name,
                    extraction.table.row_count(),
                    extraction.table.column_count()
                );

                for output in &job.outputs {
                    let destination = output.destination(&path, &extraction.sheet_name);
                    output_writer(output, &policy)?.write(&extraction.table, &destination)?;
                    report.outputs.push(WrittenOutput {
                        workbook: path.clone(),
                        sheet_name: extraction.sheet_name.clone(),
                        destination,
                        rows: extraction.table.row_count(),
                        columns: extraction.table.column_count(),
                    });
                }
            }
        }
    }

    Ok(report)
}

fn output_writer(output: &OutputConfig, policy: &PathPolicy) -> SheetflatResult<Box<dyn TableWriter>> {
    match output {
        OutputConfig::Xlsx {
            sheet_name: Some(name),
            ..
        } => writer_for(output.format(), policy.clone(), Some(name), Vec::new()),
        OutputConfig::Sqlite { table, columns, .. } => {
            writer_for(output.format(), policy.clone(), Some(table), columns.clone())
        }
        _ => writer_for(output.format(), policy.clone(), None, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_xlsxwriter::Workbook;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn bulletin(path: &Path) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Furtos 2022").unwrap();
        sheet.write_string(0, 0, "Boletim SSP").unwrap();
        sheet.write_string(2, 0, "Município").unwrap();
        sheet.write_string(2, 1, "Furtos").unwrap();
        sheet.write_string(3, 0, "Canoas").unwrap();
        sheet.write_number(3, 1, 12.0).unwrap();
        sheet.write_string(4, 0, "Pelotas").unwrap();
        sheet.write_number(4, 1, 7.0).unwrap();
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_runs_job_file() {
        let dir = TempDir::new().unwrap();
        bulletin(&dir.path().join("Bulletin-2022.xlsx"));

        let root = dir.path().display().to_string();
        let yaml = format!(
            r#"
allowed_paths: ["{root}"]
jobs:
  - workbooks: [Bulletin-2022.xlsx]
    header: {{ start_row: 3 }}
    data: {{ start_row: 4 }}
    outputs:
      - {{ format: csv, path: "{root}/out/{{file}}/{{sheet}}/dados.csv" }}
      - {{ format: sqlite, path: "{root}/etl.db", table: furtos }}
"#
        );
        let config = Config::parse(&yaml, dir.path().to_path_buf()).unwrap();
        let report = run_config(&config).unwrap();

        assert_eq!(report.tables_written(), 2);
        assert_eq!(report.rows_written(), 4);
        assert_eq!(report.outputs[0].sheet_name, "Furtos 2022");

        let csv = dir.path().join("out/bulletin-2022/Furtos_2022/dados.csv");
        assert_eq!(report.outputs[0].destination, csv);
        assert_eq!(
            fs::read_to_string(&csv).unwrap(),
            "municipio,furtos\nCanoas,12\nPelotas,7\n"
        );
        assert!(dir.path().join("etl.db").exists());
    }

    #[test]
    fn test_stops_at_missing_workbook() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().display().to_string();
        let yaml = format!(
            r#"
allowed_paths: ["{root}"]
jobs:
  - workbooks: [absent.xlsx]
    header: {{ start_row: 1 }}
    data: {{ start_row: 2 }}
    outputs:
      - {{ format: csv, path: "{root}/dados.csv" }}
"#
        );
        let config = Config::parse(&yaml, dir.path().to_path_buf()).unwrap();

        assert!(run_config(&config).is_err());
        assert!(!dir.path().join("dados.csv").exists());
    }
}
