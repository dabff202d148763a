//! CLI command handlers

pub mod commands;

pub use commands::{extract, headers, merge, run, sanitize};

use crate::error::SheetflatResult;
use crate::excel::cell_ref::parse_column;
use crate::types::{ColumnCase, DatePattern, HeaderRegion, SheetSelector, DEFAULT_STRFTIME};
use clap::Args;

/// Where the header sits on the sheet, shared by `extract` and `headers`
#[derive(Debug, Clone, Args)]
pub struct RegionArgs {
    /// Sheet name, or 0-based position when no sheet has that name (default: first sheet)
    #[arg(short, long)]
    pub sheet: Option<String>,

    /// First header row (1-based)
    #[arg(long)]
    pub header_start: u32,

    /// Last header row, inclusive (default: same as --header-start)
    #[arg(long)]
    pub header_end: Option<u32>,

    /// Number of leading header rows whose blanks inherit the value to their left
    #[arg(long, default_value_t = 0)]
    pub ffill: u32,

    /// First column, as a number or letters
    #[arg(long)]
    pub start_col: Option<String>,

    /// Last column, as a number or letters (default: last used column)
    #[arg(long)]
    pub end_col: Option<String>,

    /// strftime pattern for date cells in the header
    #[arg(long, default_value = DEFAULT_STRFTIME)]
    pub strftime: String,

    /// Keep the letter case of column names
    #[arg(long)]
    pub preserve_case: bool,
}

impl RegionArgs {
    pub fn selector(&self) -> SheetSelector {
        SheetSelector::from(self.sheet.as_deref())
    }

    pub fn columns(&self) -> SheetflatResult<(Option<u32>, Option<u32>)> {
        let parse = |text: &Option<String>| text.as_deref().map(parse_column).transpose();
        Ok((parse(&self.start_col)?, parse(&self.end_col)?))
    }

    pub fn header_region(&self) -> SheetflatResult<HeaderRegion> {
        let (start_col, end_col) = self.columns()?;
        let case = if self.preserve_case {
            ColumnCase::Preserve
        } else {
            ColumnCase::Lower
        };
        let region = HeaderRegion::new(
            self.header_start,
            self.header_end.unwrap_or(self.header_start),
            self.ffill,
        )?
        .with_columns(start_col, end_col)
        .with_case(case);
        region.validate()?;
        Ok(region)
    }

    pub fn dates(&self) -> SheetflatResult<DatePattern> {
        DatePattern::new(&self.strftime)
    }
}
