//! Identity Registry: source subject id to synthetic person id.
//!
//! Ids come from the `person_origin` AUTOINCREMENT sequence and the
//! `(registry, source_person_id)` unique constraint keeps a subject from
//! being allocated twice. Call inside the caller's transaction so a rolled
//! back load also returns its id to the sequence.

use cdm_model::{PersonId, SubjectId};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::{Result, StoreError};

pub fn lookup_person(
    conn: &Connection,
    registry: &str,
    subject: &SubjectId,
) -> Result<Option<PersonId>> {
    conn.query_row(
        "SELECT person_id FROM person_origin WHERE registry = ?1 AND source_person_id = ?2",
        params![registry, subject.as_str()],
        |row| row.get(0).map(PersonId::new),
    )
    .optional()
    .map_err(StoreError::read("person origin"))
}

/// Return the subject's person id, allocating the next one on first sight.
pub fn resolve_or_allocate(
    conn: &Connection,
    registry: &str,
    subject: &SubjectId,
) -> Result<PersonId> {
    if let Some(person) = lookup_person(conn, registry, subject)? {
        return Ok(person);
    }
    conn.execute(
        "INSERT INTO person_origin (registry, source_person_id) VALUES (?1, ?2)",
        params![registry, subject.as_str()],
    )
    .map_err(StoreError::write("person_origin"))?;
    let person = PersonId::new(conn.last_insert_rowid());
    debug!(person_id = person.get(), "allocated person id");
    Ok(person)
}
