//! Shared CSV utilities for loading mapping and vocabulary files.

use std::collections::BTreeMap;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::error::StandardsError;

/// Read a delimited file into a vector of row maps.
///
/// Each row is represented as a BTreeMap with column headers as keys.
/// Handles BOM characters and trims whitespace from values. Fails when any
/// of `required` is not a header.
pub fn read_delimited_rows(
    path: &Path,
    delimiter: u8,
    required: &[&str],
) -> Result<Vec<BTreeMap<String, String>>, StandardsError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| open_error(path, e))?;

    let headers = normalized_headers(
        reader
            .headers()
            .map_err(|e| StandardsError::csv(path, &e))?,
    );
    require_columns(path, &headers, required)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| StandardsError::csv(path, &e))?;
        let mut row = BTreeMap::new();
        for (idx, value) in record.iter().enumerate() {
            let key = headers.get(idx).cloned().unwrap_or_default();
            row.insert(key, value.trim().to_string());
        }
        rows.push(row);
    }
    Ok(rows)
}

pub(crate) fn normalized_headers(headers: &StringRecord) -> Vec<String> {
    headers
        .iter()
        .map(|h| h.trim().trim_matches('\u{feff}').to_string())
        .collect()
}

pub(crate) fn open_error(path: &Path, error: csv::Error) -> StandardsError {
    match error.into_kind() {
        csv::ErrorKind::Io(source) => StandardsError::io(path, source),
        other => StandardsError::Csv {
            path: path.to_path_buf(),
            message: format!("{other:?}"),
        },
    }
}

/// Require a set of columns to be present in a header row.
pub(crate) fn require_columns(
    path: &Path,
    headers: &[String],
    columns: &[&str],
) -> Result<(), StandardsError> {
    for column in columns {
        if !headers.iter().any(|h| h == column) {
            return Err(StandardsError::MissingColumn {
                path: path.to_path_buf(),
                column: (*column).to_string(),
            });
        }
    }
    Ok(())
}

/// Get a field value from a row, returning empty string if not present.
pub fn get_field(row: &BTreeMap<String, String>, key: &str) -> String {
    row.get(key).cloned().unwrap_or_default()
}
