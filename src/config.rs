//! YAML job files
//!
//! A job file names the directories writes are allowed into and a list of
//! jobs. Each job reads the same header and data regions from one or more
//! sheets of one or more workbooks and writes every resulting table to each
//! of its outputs.
//!
//! ```yaml
//! allowed_paths: [/tmp/]
//! jobs:
//!   - workbooks: [bulletin-2022.xlsx]
//!     sheets: ["2022"]
//!     header: { start_row: 12 }
//!     data: { start_row: 13 }
//!     outputs:
//!       - { format: csv, path: "/tmp/out/{file}/{sheet}/dados.csv" }
//! ```

use crate::error::{SheetflatError, SheetflatResult};
use crate::excel::cell_ref::parse_column;
use crate::sanitize::sanitize;
use crate::transform::ExtractOptions;
use crate::types::{ColumnCase, DataRegion, DatePattern, HeaderRegion, SheetSelector, DEFAULT_STRFTIME};
use crate::writer::{ColumnMapping, OutputFormat, PathPolicy};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A loaded and validated job file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub allowed_paths: Vec<PathBuf>,
    pub jobs: Vec<JobConfig>,
    /// Directory relative workbook paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    pub workbooks: Vec<PathBuf>,
    #[serde(default)]
    pub sheets: Vec<String>,
    #[serde(default)]
    pub start_col: Option<ColumnRef>,
    #[serde(default)]
    pub end_col: Option<ColumnRef>,
    pub header: HeaderConfig,
    pub data: DataConfig,
    #[serde(default)]
    pub strftime: Option<String>,
    #[serde(default)]
    pub preserve_case: bool,
    pub outputs: Vec<OutputConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderConfig {
    pub start_row: u32,
    /// Defaults to `start_row`
    #[serde(default)]
    pub end_row: Option<u32>,
    #[serde(default)]
    pub forward_fill_rows: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    pub start_row: u32,
}

/// A column given as a 1-based number (`3`) or as letters (`C`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Number(u32),
    Letters(String),
}

impl ColumnRef {
    pub fn number(&self) -> SheetflatResult<u32> {
        match self {
            ColumnRef::Number(0) => Err(SheetflatError::InvalidRegion(
                "Column numbers start at 1".to_string(),
            )),
            ColumnRef::Number(n) => Ok(*n),
            ColumnRef::Letters(text) => parse_column(text),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Number(n) => write!(f, "{}", n),
            ColumnRef::Letters(text) => write!(f, "{}", text),
        }
    }
}

/// One destination of a job; `path` may contain `{file}` and `{sheet}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase", deny_unknown_fields)]
pub enum OutputConfig {
    Csv {
        path: String,
    },
    Parquet {
        path: String,
    },
    Xlsx {
        path: String,
        #[serde(default)]
        sheet_name: Option<String>,
    },
    Sqlite {
        path: String,
        table: String,
        #[serde(default)]
        columns: Vec<ColumnMapping>,
    },
}

impl OutputConfig {
    pub fn format(&self) -> OutputFormat {
        match self {
            OutputConfig::Csv { .. } => OutputFormat::Csv,
            OutputConfig::Parquet { .. } => OutputFormat::Parquet,
            OutputConfig::Xlsx { .. } => OutputFormat::Xlsx,
            OutputConfig::Sqlite { .. } => OutputFormat::Sqlite,
        }
    }

    pub fn path_template(&self) -> &str {
        match self {
            OutputConfig::Csv { path }
            | OutputConfig::Parquet { path }
            | OutputConfig::Xlsx { path, .. }
            | OutputConfig::Sqlite { path, .. } => path,
        }
    }

    /// Fill the `{file}` and `{sheet}` placeholders of the destination
    pub fn destination(&self, workbook: &Path, sheet_name: &str) -> PathBuf {
        render_path(self.path_template(), workbook, sheet_name)
    }
}

/// `{file}` becomes the lowercased workbook stem and `{sheet}` the sanitized sheet name
pub fn render_path(template: &str, workbook: &Path, sheet_name: &str) -> PathBuf {
    let stem = workbook
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    PathBuf::from(
        template
            .replace("{file}", &stem)
            .replace("{sheet}", &sanitize(sheet_name)),
    )
}

impl Config {
    /// Read, parse and validate a job file
    pub fn load(path: &Path) -> SheetflatResult<Self> {
        let content = fs::read_to_string(path)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&content, base_dir)
    }

    pub fn parse(content: &str, base_dir: PathBuf) -> SheetflatResult<Self> {
        let mut config: Config = serde_yaml::from_str(content)?;
        config.base_dir = base_dir;
        config.validate()?;
        debug!("Loaded {} jobs", config.jobs.len());
        Ok(config)
    }

    pub fn policy(&self) -> SheetflatResult<PathPolicy> {
        PathPolicy::new(self.allowed_paths.iter().cloned())
    }

    /// Workbook path as given when absolute, else relative to the job file
    pub fn workbook_path(&self, workbook: &Path) -> PathBuf {
        if workbook.is_absolute() {
            workbook.to_path_buf()
        } else {
            self.base_dir.join(workbook)
        }
    }

    pub fn validate(&self) -> SheetflatResult<()> {
        let policy = self.policy()?;
        if self.jobs.is_empty() {
            return Err(SheetflatError::Config("No jobs defined".to_string()));
        }

        for (index, job) in self.jobs.iter().enumerate() {
            let context = |message: String| SheetflatError::Config(format!("Job {}: {}", index + 1, message));

            if job.workbooks.is_empty() {
                return Err(context("no workbooks listed".to_string()));
            }
            if job.outputs.is_empty() {
                return Err(context("no outputs listed".to_string()));
            }
            job.header_region().map_err(|e| context(e.to_string()))?;
            job.data_region().map_err(|e| context(e.to_string()))?;
            job.dates().map_err(|e| context(e.to_string()))?;

            for output in &job.outputs {
                if let OutputConfig::Sqlite { table, .. } = output {
                    if sanitize(table).is_empty() {
                        return Err(context(format!("invalid SQLite table name '{}'", table)));
                    }
                }
                // Catch destinations outside the allow-list before any work is done
                let sample = output.destination(Path::new("workbook.xlsx"), "sheet");
                policy.check(&sample).map_err(|e| context(e.to_string()))?;
            }
        }
        Ok(())
    }
}

impl JobConfig {
    fn columns(&self) -> SheetflatResult<(Option<u32>, Option<u32>)> {
        let start = self.start_col.as_ref().map(ColumnRef::number).transpose()?;
        let end = self.end_col.as_ref().map(ColumnRef::number).transpose()?;
        Ok((start, end))
    }

    pub fn header_region(&self) -> SheetflatResult<HeaderRegion> {
        let (start_col, end_col) = self.columns()?;
        let case = if self.preserve_case {
            ColumnCase::Preserve
        } else {
            ColumnCase::Lower
        };
        let region = HeaderRegion::new(
            self.header.start_row,
            self.header.end_row.unwrap_or(self.header.start_row),
            self.header.forward_fill_rows,
        )?
        .with_columns(start_col, end_col)
        .with_case(case);
        region.validate()?;
        Ok(region)
    }

    pub fn data_region(&self) -> SheetflatResult<DataRegion> {
        let (start_col, end_col) = self.columns()?;
        let region = DataRegion::new(self.data.start_row)?.with_columns(start_col, end_col);
        region.validate()?;
        Ok(region)
    }

    pub fn dates(&self) -> SheetflatResult<DatePattern> {
        DatePattern::new(self.strftime.as_deref().unwrap_or(DEFAULT_STRFTIME))
    }

    /// Sheets to read; no entry means the first sheet
    pub fn selectors(&self) -> Vec<SheetSelector> {
        if self.sheets.is_empty() {
            vec![SheetSelector::First]
        } else {
            self.sheets.iter().map(|s| SheetSelector::from(s.as_str())).collect()
        }
    }

    pub fn extract_options(&self, sheet: SheetSelector) -> SheetflatResult<ExtractOptions> {
        Ok(ExtractOptions::new(self.header_region()?, self.data_region()?)
            .with_sheet(sheet)
            .with_dates(self.dates()?))
    }
}
