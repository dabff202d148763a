use crate::error::{SheetflatError, SheetflatResult};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use std::fmt::{self, Write as _};

/// Default pattern for date/time header cells
pub const DEFAULT_STRFTIME: &str = "%d/%m/%Y, %H:%M:%S";

//==============================================================================
// Sheet Selection
//==============================================================================

/// Which worksheet of a workbook to read
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SheetSelector {
    /// The first worksheet in workbook order
    #[default]
    First,
    /// A sheet name; falls back to a 0-based position when no sheet has this name
    Named(String),
    /// A 0-based position in workbook order
    Position(usize),
}

impl From<&str> for SheetSelector {
    fn from(text: &str) -> Self {
        if text.is_empty() {
            SheetSelector::First
        } else {
            SheetSelector::Named(text.to_string())
        }
    }
}

impl From<Option<&str>> for SheetSelector {
    fn from(text: Option<&str>) -> Self {
        text.map_or(SheetSelector::First, SheetSelector::from)
    }
}

impl fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetSelector::First => write!(f, "#0"),
            SheetSelector::Named(name) => write!(f, "{}", name),
            SheetSelector::Position(n) => write!(f, "#{}", n),
        }
    }
}

//==============================================================================
// Region Geometry (1-based rows and columns)
//==============================================================================

/// Letter case applied to derived column names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnCase {
    #[default]
    Lower,
    Preserve,
}

/// Rectangular range whose rows together define the column names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRegion {
    pub start_row: u32,
    /// Inclusive; `end_row < start_row` is a region without rows
    pub end_row: u32,
    /// Leading rows in which empty cells inherit the value to their left
    pub forward_fill_rows: u32,
    pub start_col: u32,
    /// Defaults to the last used column of the sheet
    pub end_col: Option<u32>,
    pub case: ColumnCase,
}

impl HeaderRegion {
    /// Create a header region starting at column 1, validating its invariants
    pub fn new(start_row: u32, end_row: u32, forward_fill_rows: u32) -> SheetflatResult<Self> {
        let region = Self {
            start_row,
            end_row,
            forward_fill_rows,
            start_col: 1,
            end_col: None,
            case: ColumnCase::default(),
        };
        region.validate()?;
        Ok(region)
    }

    /// Restrict the region to a column window
    pub fn with_columns(mut self, start_col: Option<u32>, end_col: Option<u32>) -> Self {
        self.start_col = start_col.unwrap_or(1);
        self.end_col = end_col;
        self
    }

    pub fn with_case(mut self, case: ColumnCase) -> Self {
        self.case = case;
        self
    }

    /// Number of header rows (0 when the region is empty)
    pub fn row_count(&self) -> u32 {
        if self.end_row < self.start_row {
            0
        } else {
            self.end_row - self.start_row + 1
        }
    }

    pub fn validate(&self) -> SheetflatResult<()> {
        if self.start_row == 0 {
            return Err(SheetflatError::InvalidRegion(
                "Header rows are numbered from 1".to_string(),
            ));
        }
        if self.start_col == 0 {
            return Err(SheetflatError::InvalidRegion(
                "Header columns are numbered from 1".to_string(),
            ));
        }
        if self.forward_fill_rows > self.row_count() {
            return Err(SheetflatError::InvalidRegion(format!(
                "forward_fill_rows ({}) exceeds the {} header row(s)",
                self.forward_fill_rows,
                self.row_count()
            )));
        }
        if let Some(end_col) = self.end_col {
            if end_col < self.start_col {
                return Err(SheetflatError::InvalidRegion(format!(
                    "Header end column {} is before start column {}",
                    end_col, self.start_col
                )));
            }
        }
        Ok(())
    }
}

/// Open-ended (downward) range holding the records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRegion {
    pub start_row: u32,
    pub start_col: u32,
    /// Defaults to the last used column of the sheet
    pub end_col: Option<u32>,
}

impl DataRegion {
    pub fn new(start_row: u32) -> SheetflatResult<Self> {
        let region = Self {
            start_row,
            start_col: 1,
            end_col: None,
        };
        region.validate()?;
        Ok(region)
    }

    pub fn with_columns(mut self, start_col: Option<u32>, end_col: Option<u32>) -> Self {
        self.start_col = start_col.unwrap_or(1);
        self.end_col = end_col;
        self
    }

    pub fn validate(&self) -> SheetflatResult<()> {
        if self.start_row == 0 || self.start_col == 0 {
            return Err(SheetflatError::InvalidRegion(
                "Data rows and columns are numbered from 1".to_string(),
            ));
        }
        if let Some(end_col) = self.end_col {
            if end_col < self.start_col {
                return Err(SheetflatError::InvalidRegion(format!(
                    "Data end column {} is before start column {}",
                    end_col, self.start_col
                )));
            }
        }
        Ok(())
    }
}

//==============================================================================
// Date Formatting
//==============================================================================

/// A strftime pattern checked once, so formatting can never fail later
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatePattern(String);

impl DatePattern {
    pub fn new(pattern: &str) -> SheetflatResult<Self> {
        // Offset items (%z, %Z, %+) parse fine but cannot render a naive value
        let mut sample = String::new();
        let renders = write!(sample, "{}", NaiveDateTime::default().format(pattern)).is_ok();
        if !renders || StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(SheetflatError::Config(format!(
                "Invalid strftime pattern: {}",
                pattern
            )));
        }
        Ok(Self(pattern.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn format(&self, value: &NaiveDateTime) -> String {
        value.format(&self.0).to_string()
    }
}

impl Default for DatePattern {
    fn default() -> Self {
        Self(DEFAULT_STRFTIME.to_string())
    }
}
