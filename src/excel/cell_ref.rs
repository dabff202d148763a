//! Column references (A → 1, Z → 26, AA → 27)

use crate::error::{SheetflatError, SheetflatResult};

/// Parse a column given either as letters (`C`, `aa`) or as a 1-based number (`3`)
pub fn parse_column(text: &str) -> SheetflatResult<u32> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SheetflatError::InvalidRegion(
            "Empty column reference".to_string(),
        ));
    }

    if let Ok(number) = text.parse::<u32>() {
        if number == 0 {
            return Err(SheetflatError::InvalidRegion(
                "Columns are numbered from 1".to_string(),
            ));
        }
        return Ok(number);
    }

    let mut number: u32 = 0;
    for c in text.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(SheetflatError::InvalidRegion(format!(
                "Invalid column reference: {}",
                text
            )));
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        number = number
            .checked_mul(26)
            .and_then(|n| n.checked_add(digit))
            .ok_or_else(|| {
                SheetflatError::InvalidRegion(format!("Column reference too large: {}", text))
            })?;
    }

    Ok(number)
}
