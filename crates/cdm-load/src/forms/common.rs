use chrono::NaiveDate;
use cdm_model::SourceRecord;

use crate::error::{LoadError, Result};
use crate::scope::SubjectScope;
use crate::values::{parse_date, shift_days};

pub(super) fn required<'r>(record: &'r SourceRecord, field: &'static str) -> Result<&'r str> {
    record.get(field).ok_or(LoadError::MissingField { field })
}

pub(super) fn optional_date(record: &SourceRecord, field: &str) -> Result<Option<NaiveDate>> {
    record
        .get(field)
        .map(|raw| parse_date(field, raw))
        .transpose()
}

/// The record's own date, or the admission date when the cell is empty.
pub(super) fn date_or_admission(
    scope: &mut SubjectScope<'_>,
    record: &SourceRecord,
    field: &str,
) -> Result<NaiveDate> {
    match optional_date(record, field)? {
        Some(date) => Ok(date),
        None => scope.admission_date(),
    }
}

/// The record's own date, or `lookback_days` before admission.
pub(super) fn date_or_before_admission(
    scope: &mut SubjectScope<'_>,
    record: &SourceRecord,
    field: &str,
    lookback_days: i64,
) -> Result<NaiveDate> {
    match optional_date(record, field)? {
        Some(date) => Ok(date),
        None => {
            let admission = scope.admission_date()?;
            shift_days(field, admission, -lookback_days)
        }
    }
}
