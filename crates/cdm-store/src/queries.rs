//! Reads used by the load rules and the relationship pass.

use chrono::NaiveDate;
use cdm_model::{
    CareSiteId, ConceptId, EpisodeId, EventField, FactId, FactRelationship, PersonId, VisitId,
};
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Result, StoreError};
use crate::schema::TABLES;

/// Date of the observation that records hospital admission.
pub fn admission_date(
    conn: &Connection,
    person: PersonId,
    admission_concept: ConceptId,
) -> Result<Option<NaiveDate>> {
    conn.query_row(
        "SELECT observation_date FROM observation
         WHERE person_id = ?1 AND observation_concept_id = ?2
         ORDER BY observation_id LIMIT 1",
        params![person.get(), admission_concept.get()],
        |row| row.get(0),
    )
    .optional()
    .map_err(StoreError::read("admission date"))
}

pub fn visit_for_person(conn: &Connection, person: PersonId) -> Result<Option<VisitId>> {
    conn.query_row(
        "SELECT visit_occurrence_id FROM visit_occurrence WHERE person_id = ?1",
        [person.get()],
        |row| row.get(0).map(VisitId::new),
    )
    .optional()
    .map_err(StoreError::read("visit"))
}

pub fn episode_for_person(conn: &Connection, person: PersonId) -> Result<Option<EpisodeId>> {
    conn.query_row(
        "SELECT episode_id FROM episode WHERE person_id = ?1",
        [person.get()],
        |row| row.get(0).map(EpisodeId::new),
    )
    .optional()
    .map_err(StoreError::read("episode"))
}

/// Facts attached to an episode under one role, oldest first.
pub fn episode_event_ids(
    conn: &Connection,
    episode: EpisodeId,
    field: EventField,
) -> Result<Vec<FactId>> {
    let mut stmt = conn
        .prepare(
            "SELECT event_id FROM episode_event
             WHERE episode_id = ?1 AND episode_event_field_concept_id = ?2
             ORDER BY event_id",
        )
        .map_err(StoreError::read("episode events"))?;
    stmt.query_map(params![episode.get(), field.concept().get()], |row| {
        row.get(0).map(FactId::new)
    })
    .and_then(Iterator::collect)
    .map_err(StoreError::read("episode events"))
}

pub fn care_site_id(conn: &Connection, source_value: &str) -> Result<Option<CareSiteId>> {
    conn.query_row(
        "SELECT care_site_id FROM care_site WHERE care_site_source_value = ?1",
        [source_value],
        |row| row.get(0).map(CareSiteId::new),
    )
    .optional()
    .map_err(StoreError::read("care site"))
}

/// A subject eligible for the episode relationship pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpisodeCandidate {
    pub person_id: PersonId,
    pub episode_id: EpisodeId,
}

/// Persons of `registry` with tracker rows for both forms and an episode
/// with the given object concept.
pub fn persons_for_episode_pass(
    conn: &Connection,
    registry: &str,
    focus_form: &str,
    treatment_form: &str,
    object_concept: ConceptId,
) -> Result<Vec<EpisodeCandidate>> {
    let mut stmt = conn
        .prepare(
            "SELECT o.person_id, e.episode_id
             FROM person_origin o
             JOIN episode e ON e.person_id = o.person_id
             WHERE o.registry = ?1
               AND e.episode_object_concept_id = ?2
               AND EXISTS (SELECT 1 FROM etl_tracking t
                           WHERE t.source_person_id = o.source_person_id AND t.form_name = ?3)
               AND EXISTS (SELECT 1 FROM etl_tracking t
                           WHERE t.source_person_id = o.source_person_id AND t.form_name = ?4)
             ORDER BY o.person_id",
        )
        .map_err(StoreError::read("episode candidates"))?;
    stmt.query_map(
        params![registry, object_concept.get(), focus_form, treatment_form],
        |row| {
            Ok(EpisodeCandidate {
                person_id: PersonId::new(row.get(0)?),
                episode_id: EpisodeId::new(row.get(1)?),
            })
        },
    )
    .and_then(Iterator::collect)
    .map_err(StoreError::read("episode candidates"))
}

pub fn relationship_exists(conn: &Connection, row: &FactRelationship) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM fact_relationship
         WHERE domain_concept_id_1 = ?1 AND fact_id_1 = ?2
           AND domain_concept_id_2 = ?3 AND fact_id_2 = ?4
           AND relationship_concept_id = ?5)",
        params![
            row.domain_1.concept().get(),
            row.fact_1.get(),
            row.domain_2.concept().get(),
            row.fact_2.get(),
            row.relationship_concept_id.get(),
        ],
        |row| row.get(0),
    )
    .map_err(StoreError::read("fact relationship"))
}

/// Row count of one of the store's own tables.
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    if !TABLES.contains(&table) {
        return Err(StoreError::UnknownTable(table.to_string()));
    }
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .map_err(StoreError::read("row count"))
}
