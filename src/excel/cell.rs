//! Cell value conversions shared by header and data extraction

use crate::types::DatePattern;
use calamine::{Data, DataType};
use chrono::NaiveDateTime;

/// Pattern used for date/time values inside assembled tables
pub const TABLE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Empty, empty text, zero and `false` all count as "no value"
pub fn is_falsy(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.is_empty(),
        Data::Int(i) => *i == 0,
        Data::Float(f) => *f == 0.0,
        Data::Bool(b) => !*b,
        _ => false,
    }
}

/// Date/time payload of a cell, only for cells typed as dates
pub fn as_datetime(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::DateTime(_) | Data::DateTimeIso(_) => cell.as_datetime(),
        _ => None,
    }
}

/// Text of a header cell: dates through `dates`, falsy values as ""
pub fn header_text(cell: &Data, dates: &DatePattern) -> String {
    if let Some(value) = as_datetime(cell) {
        return dates.format(&value);
    }
    if is_falsy(cell) {
        String::new()
    } else {
        cell.to_string()
    }
}

/// Text of a data cell inside an assembled table
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        _ => match as_datetime(cell) {
            Some(value) => value.format(TABLE_DATETIME_FORMAT).to_string(),
            None => cell.to_string(),
        },
    }
}
