//! Parsing of raw export cells.
//!
//! Exports carry ISO dates (`2024-03-01`, sometimes followed by a time) and
//! numbers that may use a decimal comma.

use chrono::{NaiveDate, TimeDelta};

use crate::error::{LoadError, Result};

const DATE_LEN: usize = 10;

pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed.get(..DATE_LEN).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| LoadError::invalid(field, raw))
}

pub fn parse_number(field: &str, raw: &str) -> Result<f64> {
    let normalized = raw.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| LoadError::invalid(field, raw))
}

/// Whole days. `"3.0"` is accepted, `"3.5"` is not.
pub fn parse_days(field: &str, raw: &str) -> Result<i64> {
    let value = parse_number(field, raw)?;
    if value.fract() != 0.0 || value.abs() > 36_500.0 {
        return Err(LoadError::invalid(field, raw));
    }
    Ok(value as i64)
}

/// `date` moved by `days` (negative moves back).
pub fn shift_days(field: &str, date: NaiveDate, days: i64) -> Result<NaiveDate> {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(|| LoadError::invalid(field, &days.to_string()))
}
