use anyhow::Context;
use clap::{Parser, Subcommand};
use sheetflat::cli::{self, RegionArgs};
use sheetflat::merge::DEFAULT_ENCODING;
use sheetflat::writer::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetflat")]
#[command(about = "Flatten spreadsheet reports into CSV, Parquet, XLSX or SQLite tables.")]
#[command(long_about = "Sheetflat - spreadsheet reports to flat tables

Reads a header region and a data region from one worksheet, derives safe
column names and writes the table to an allowed destination.

COMMANDS:
  extract   - One worksheet to one output file
  headers   - Show the column names a header region produces
  run       - Execute a YAML job file
  merge     - Combine delimited exports into one output file
  sanitize  - Turn text into a safe identifier

EXAMPLES:
  sheetflat extract bulletin-2022.xlsx --sheet 2022 --header-start 12 --data-start 13 \\
      --output /tmp/out/dados.csv --allow /tmp/
  sheetflat headers bulletin-2022.xlsx --header-start 11 --header-end 12 --ffill 1
  sheetflat run jobs.yaml
  sheetflat merge 2021.csv 2022.csv --output /tmp/ssp.parquet --allow /tmp/

Writes are confined to the --allow prefixes (or SHEETFLAT_ALLOWED_PATHS).
Set RUST_LOG=sheetflat=info for progress logs.")]
#[command(version)]
struct Cli {
    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Extract one worksheet into a table and write it.

Header rows are folded into one name per column: the non-empty cells of a
column are joined with '_' and sanitized. With --ffill N, blank cells in the
first N header rows take the value to their left (merged cells).

Data rows start at --data-start and stop after 3 consecutive blank rows.

FORMATS:
  csv, parquet, xlsx, sqlite - inferred from the --output extension
  (.csv, .parquet, .xlsx, .db) when --format is omitted.

EXAMPLE:
  sheetflat extract bulletin-2022.xlsx --sheet 2022 \\
      --header-start 11 --header-end 12 --ffill 1 --data-start 13 \\
      --start-col A --end-col P --output /tmp/out/dados.parquet --allow /tmp/")]
    /// Extract one worksheet into a table file
    Extract {
        /// Path to the workbook (.xlsx, .xlsm, .xlsb, .xls, .ods)
        workbook: PathBuf,

        #[command(flatten)]
        region: RegionArgs,

        /// First data row (1-based)
        #[arg(long)]
        data_start: u32,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (default: from the output extension)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// SQLite table or XLSX sheet name (default: the resolved sheet name)
        #[arg(long)]
        table: Option<String>,

        /// Allowed destination directories, comma separated
        #[arg(long, value_delimiter = ',', env = "SHEETFLAT_ALLOWED_PATHS", required = true)]
        allow: Vec<PathBuf>,
    },

    /// Show the column names a header region produces
    Headers {
        /// Path to the workbook
        workbook: PathBuf,

        #[command(flatten)]
        region: RegionArgs,

        /// Print {"sheet": ..., "columns": [...]} as JSON
        #[arg(long)]
        json: bool,
    },

    #[command(long_about = "Execute a YAML job file.

The whole file is validated before anything is read or written: allowed
paths, header and data regions, strftime patterns and output destinations.

EXAMPLE FILE:
  allowed_paths: [/tmp/]
  jobs:
    - workbooks: [bulletin-2022.xlsx]
      sheets: [\"2022\"]
      header: { start_row: 12 }
      data: { start_row: 13 }
      outputs:
        - { format: csv, path: \"/tmp/out/{file}/{sheet}/dados.csv\" }
        - { format: sqlite, path: /tmp/etl.db, table: dados }

Relative workbook paths are resolved against the job file's directory.")]
    /// Execute a YAML job file
    Run {
        /// Path to the job file
        config: PathBuf,
    },

    /// Merge delimited exports into one table file
    Merge {
        /// Delimited files, merged in the given order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,

        /// Field delimiter of the input files
        #[arg(short, long, default_value_t = ';')]
        delimiter: char,

        /// Encoding label of the input files (cp1252, latin1, utf-8, ...)
        #[arg(short, long, default_value = DEFAULT_ENCODING)]
        encoding: String,

        /// Output format (default: from the output extension)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// SQLite table or XLSX sheet name (default: the output file stem)
        #[arg(long)]
        table: Option<String>,

        /// Allowed destination directories, comma separated
        #[arg(long, value_delimiter = ',', env = "SHEETFLAT_ALLOWED_PATHS", required = true)]
        allow: Vec<PathBuf>,
    },

    /// Print the safe identifier form of TEXT
    Sanitize {
        /// Text to sanitize
        text: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "sheetflat=debug"
    } else {
        "sheetflat=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Extract {
            workbook,
            region,
            data_start,
            output,
            format,
            table,
            allow,
        } => {
            let context = format!("Failed to extract {}", workbook.display());
            cli::extract(workbook, region, data_start, output, format, table, allow).context(context)
        }

        Commands::Headers {
            workbook,
            region,
            json,
        } => {
            let context = format!("Failed to read headers of {}", workbook.display());
            cli::headers(workbook, region, json).context(context)
        }

        Commands::Run { config } => {
            let context = format!("Failed to run {}", config.display());
            cli::run(config).context(context)
        }

        Commands::Merge {
            files,
            output,
            delimiter,
            encoding,
            format,
            table,
            allow,
        } => {
            let context = format!("Failed to merge into {}", output.display());
            cli::merge(files, output, delimiter, encoding, format, table, allow).context(context)
        }

        Commands::Sanitize { text } => {
            cli::sanitize(text);
            Ok(())
        }
    }
}
