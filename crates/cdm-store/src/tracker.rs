//! Processing Tracker: at most one load per (subject, form).

use chrono::NaiveDate;
use cdm_model::{InvalidFieldReport, QualityFlag, SubjectId};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::{Result, StoreError};

pub fn is_processed(conn: &Connection, subject: &SubjectId, form: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM etl_tracking WHERE source_person_id = ?1 AND form_name = ?2)",
        params![subject.as_str(), form],
        |row| row.get(0),
    )
    .map_err(StoreError::read("etl tracking"))
}

/// Record a completed load. A second mark for the same pair fails.
pub fn mark_processed(
    conn: &Connection,
    subject: &SubjectId,
    form: &str,
    processed: NaiveDate,
) -> Result<()> {
    conn.execute(
        "INSERT INTO etl_tracking (source_person_id, form_name, processed_date) VALUES (?1, ?2, ?3)",
        params![subject.as_str(), form, processed],
    )
    .map_err(StoreError::write("etl_tracking"))?;
    Ok(())
}

/// Set the quality flag of a processed pair. Returns false when the pair
/// has no tracker row.
pub fn mark_quality(
    conn: &Connection,
    subject: &SubjectId,
    form: &str,
    flag: QualityFlag,
) -> Result<bool> {
    let updated = conn
        .execute(
            "UPDATE etl_tracking SET quality_check = ?3 WHERE source_person_id = ?1 AND form_name = ?2",
            params![subject.as_str(), form, flag.as_str()],
        )
        .map_err(StoreError::write("etl_tracking"))?;
    Ok(updated > 0)
}

pub fn quality_flag(conn: &Connection, subject: &SubjectId, form: &str) -> Result<Option<QualityFlag>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT quality_check FROM etl_tracking WHERE source_person_id = ?1 AND form_name = ?2",
            params![subject.as_str(), form],
            |row| row.get(0),
        )
        .optional()
        .map_err(StoreError::read("etl tracking"))?;
    Ok(raw.as_deref().and_then(QualityFlag::parse))
}

/// Outcome of applying an invalid-field report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualityUpdate {
    /// Pairs flagged invalid.
    pub flagged: usize,
    /// Pairs named in the report that were never loaded.
    pub untracked: usize,
}

/// Flag every (subject, form) named in the report as invalid, once per pair.
pub fn apply_invalid_report(conn: &Connection, report: &InvalidFieldReport) -> Result<QualityUpdate> {
    let mut update = QualityUpdate::default();
    for (subject, forms) in report.forms_by_subject() {
        let Ok(subject) = SubjectId::new(subject) else {
            continue;
        };
        for form in forms {
            if mark_quality(conn, &subject, form, QualityFlag::Invalid)? {
                update.flagged += 1;
            } else {
                debug!(form, "invalid-field report names an untracked form");
                update.untracked += 1;
            }
        }
    }
    Ok(update)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::schema::open_memory_store;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).expect("date")
    }

    #[test]
    fn processed_pairs_are_tracked() {
        let conn = open_memory_store().expect("store");
        let subject = SubjectId::new("A-1").expect("subject");
        assert!(!is_processed(&conn, &subject, "sepsis").expect("read"));
        mark_processed(&conn, &subject, "sepsis", day()).expect("mark");
        assert!(is_processed(&conn, &subject, "sepsis").expect("read"));
        assert!(!is_processed(&conn, &subject, "signos").expect("read"));
        assert_eq!(
            quality_flag(&conn, &subject, "sepsis").expect("flag"),
            Some(QualityFlag::Valid)
        );
        assert!(mark_processed(&conn, &subject, "sepsis", day()).is_err());
    }

    #[test]
    fn report_flags_each_pair_once() {
        let conn = open_memory_store().expect("store");
        let subject = SubjectId::new("A-1").expect("subject");
        mark_processed(&conn, &subject, "sepsis", day()).expect("mark");

        let report = InvalidFieldReport::new(BTreeMap::from([(
            "A-1".to_string(),
            vec![
                "sepsis:foco".to_string(),
                "sepsis:sofa".to_string(),
                "signos:temperatura".to_string(),
            ],
        )]));
        let update = apply_invalid_report(&conn, &report).expect("apply");
        assert_eq!(update, QualityUpdate { flagged: 1, untracked: 1 });
        assert_eq!(
            quality_flag(&conn, &subject, "sepsis").expect("flag"),
            Some(QualityFlag::Invalid)
        );
    }
}
