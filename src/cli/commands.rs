use super::RegionArgs;
use crate::config::Config;
use crate::error::{SheetflatError, SheetflatResult};
use crate::excel::read_headers;
use crate::merge::merge_delimited;
use crate::runner::run_config;
use crate::table::Table;
use crate::transform::{transform_workbook, ExtractOptions};
use crate::types::DataRegion;
use crate::writer::{writer_for, OutputFormat, PathPolicy};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Format given explicitly, else guessed from the destination's extension
fn resolve_format(format: Option<OutputFormat>, output: &Path) -> SheetflatResult<OutputFormat> {
    format.or_else(|| OutputFormat::from_path(output)).ok_or_else(|| {
        SheetflatError::Config(format!(
            "Cannot infer the output format of {}; pass --format",
            output.display()
        ))
    })
}

fn write_table(
    table: &Table,
    output: &Path,
    format: Option<OutputFormat>,
    name: &str,
    allow: Vec<PathBuf>,
) -> SheetflatResult<OutputFormat> {
    let format = resolve_format(format, output)?;
    let policy = PathPolicy::new(allow)?;
    writer_for(format, policy, Some(name), Vec::new())?.write(table, output)?;
    Ok(format)
}

fn print_written(table: &Table, output: &Path, format: OutputFormat) {
    println!(
        "{}",
        format!(
            "✅ Wrote {} rows x {} columns",
            table.row_count(),
            table.column_count()
        )
        .bold()
        .green()
    );
    println!("   Output: {} ({:?})", output.display().to_string().bright_blue(), format);
}

/// Execute the extract command
pub fn extract(
    workbook: PathBuf,
    region: RegionArgs,
    data_start: u32,
    output: PathBuf,
    format: Option<OutputFormat>,
    table_name: Option<String>,
    allow: Vec<PathBuf>,
) -> SheetflatResult<()> {
    println!("{}", "📄 Sheetflat - Extracting table".bold().green());
    println!("   Workbook: {}", workbook.display());
    println!("   Sheet: {}\n", region.selector().to_string().cyan());

    let (start_col, end_col) = region.columns()?;
    let options = ExtractOptions::new(
        region.header_region()?,
        DataRegion::new(data_start)?.with_columns(start_col, end_col),
    )
    .with_sheet(region.selector())
    .with_dates(region.dates()?);

    let extraction = transform_workbook(&workbook, &options)?;
    println!("   Resolved sheet: {}", extraction.sheet_name.bright_blue().bold());
    println!("   Columns: {}", extraction.table.columns().join(", ").cyan());
    println!();

    let name = table_name.unwrap_or_else(|| extraction.sheet_name.clone());
    let format = write_table(&extraction.table, &output, format, &name, allow)?;
    print_written(&extraction.table, &output, format);

    Ok(())
}

/// Execute the headers command - show the column names a region produces
pub fn headers(workbook: PathBuf, region: RegionArgs, json: bool) -> SheetflatResult<()> {
    let (columns, sheet_name) = read_headers(
        &workbook,
        &region.selector(),
        &region.header_region()?,
        &region.dates()?,
    )?;

    if json {
        let value = serde_json::json!({ "sheet": sheet_name, "columns": columns });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "🔍 Sheetflat - Headers".bold().green());
    println!("   Workbook: {}", workbook.display());
    println!("   Sheet: {}\n", sheet_name.bright_blue().bold());
    for (index, column) in columns.iter().enumerate() {
        if column.is_empty() {
            println!("   {:>3}  {}", index + 1, "(empty)".dimmed());
        } else {
            println!("   {:>3}  {}", index + 1, column.cyan());
        }
    }
    println!();
    println!("   {} columns", columns.len());

    Ok(())
}

/// Execute the run command
pub fn run(config_path: PathBuf) -> SheetflatResult<()> {
    println!("{}", "🚀 Sheetflat - Running job file".bold().green());
    println!("   File: {}\n", config_path.display());

    let config = Config::load(&config_path)?;
    println!("{}", format!("📋 {} job(s) validated", config.jobs.len()).cyan());

    let report = run_config(&config)?;
    for output in &report.outputs {
        println!(
            "   {} [{}] → {} ({} rows)",
            output.workbook.display(),
            output.sheet_name.bright_blue(),
            output.destination.display(),
            output.rows
        );
    }
    println!();
    println!(
        "{}",
        format!(
            "✅ Wrote {} table(s), {} rows in total",
            report.tables_written(),
            report.rows_written()
        )
        .bold()
        .green()
    );

    Ok(())
}

/// Execute the merge command
pub fn merge(
    files: Vec<PathBuf>,
    output: PathBuf,
    delimiter: char,
    encoding: String,
    format: Option<OutputFormat>,
    table_name: Option<String>,
    allow: Vec<PathBuf>,
) -> SheetflatResult<()> {
    println!("{}", "🧩 Sheetflat - Merging delimited files".bold().green());
    println!("   Files: {}", files.len());
    println!("   Encoding: {}\n", encoding.cyan());

    let delimiter = u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| SheetflatError::Config(format!("Delimiter must be ASCII, got '{}'", delimiter)))?;

    let table = merge_delimited(&files, delimiter, &encoding)?;

    let name = table_name.unwrap_or_else(|| {
        output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "merged".to_string())
    });
    let format = write_table(&table, &output, format, &name, allow)?;
    print_written(&table, &output, format);

    Ok(())
}

/// Execute the sanitize command
pub fn sanitize(text: String) {
    println!("{}", crate::sanitize::sanitize(&text));
}
