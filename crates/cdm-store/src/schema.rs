//! Store schema. Every statement is idempotent so opening an existing store
//! is a no-op.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Tables created by [`ensure_schema`], OMOP tables first.
pub const TABLES: [&str; 16] = [
    "person",
    "observation_period",
    "visit_occurrence",
    "condition_occurrence",
    "measurement",
    "observation",
    "procedure_occurrence",
    "drug_exposure",
    "specimen",
    "episode",
    "episode_event",
    "fact_relationship",
    "care_site",
    "person_origin",
    "etl_tracking",
    "culture_origin",
];

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS person (
  person_id INTEGER PRIMARY KEY,
  gender_concept_id INTEGER NOT NULL,
  year_of_birth INTEGER NOT NULL,
  birth_datetime TEXT,
  race_concept_id INTEGER NOT NULL DEFAULT 0,
  ethnicity_concept_id INTEGER NOT NULL DEFAULT 0,
  care_site_id INTEGER,
  person_source_value TEXT,
  gender_source_value TEXT
);

CREATE TABLE IF NOT EXISTS observation_period (
  observation_period_id INTEGER PRIMARY KEY AUTOINCREMENT,
  person_id INTEGER NOT NULL,
  observation_period_start_date TEXT NOT NULL,
  observation_period_end_date TEXT NOT NULL,
  period_type_concept_id INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS visit_occurrence (
  visit_occurrence_id INTEGER PRIMARY KEY AUTOINCREMENT,
  person_id INTEGER NOT NULL UNIQUE,
  visit_concept_id INTEGER NOT NULL,
  visit_start_date TEXT NOT NULL,
  visit_end_date TEXT NOT NULL,
  visit_type_concept_id INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS condition_occurrence (
  condition_occurrence_id INTEGER PRIMARY KEY AUTOINCREMENT,
  person_id INTEGER NOT NULL,
  condition_concept_id INTEGER NOT NULL,
  condition_start_date TEXT NOT NULL,
  condition_type_concept_id INTEGER NOT NULL,
  condition_status_concept_id INTEGER,
  visit_occurrence_id INTEGER,
  condition_source_value TEXT
);

CREATE TABLE IF NOT EXISTS measurement (
  measurement_id INTEGER PRIMARY KEY AUTOINCREMENT,
  person_id INTEGER NOT NULL,
  measurement_concept_id INTEGER NOT NULL,
  measurement_date TEXT NOT NULL,
  measurement_type_concept_id INTEGER NOT NULL,
  operator_concept_id INTEGER,
  value_as_number REAL,
  value_as_concept_id INTEGER,
  unit_concept_id INTEGER,
  visit_occurrence_id INTEGER,
  measurement_source_value TEXT,
  value_source_value TEXT,
  measurement_event_id INTEGER,
  meas_event_field_concept_id INTEGER
);

CREATE TABLE IF NOT EXISTS observation (
  observation_id INTEGER PRIMARY KEY AUTOINCREMENT,
  person_id INTEGER NOT NULL,
  observation_concept_id INTEGER NOT NULL,
  observation_date TEXT NOT NULL,
  observation_type_concept_id INTEGER NOT NULL,
  value_as_number REAL,
  value_as_concept_id INTEGER,
  qualifier_concept_id INTEGER,
  visit_occurrence_id INTEGER,
  observation_source_value TEXT,
  value_source_value TEXT,
  observation_event_id INTEGER,
  obs_event_field_concept_id INTEGER
);

CREATE TABLE IF NOT EXISTS procedure_occurrence (
  procedure_occurrence_id INTEGER PRIMARY KEY AUTOINCREMENT,
  person_id INTEGER NOT NULL,
  procedure_concept_id INTEGER NOT NULL,
  procedure_date TEXT NOT NULL,
  procedure_type_concept_id INTEGER NOT NULL,
  visit_occurrence_id INTEGER,
  procedure_source_value TEXT
);

CREATE TABLE IF NOT EXISTS drug_exposure (
  drug_exposure_id INTEGER PRIMARY KEY AUTOINCREMENT,
  person_id INTEGER NOT NULL,
  drug_concept_id INTEGER NOT NULL,
  drug_exposure_start_date TEXT NOT NULL,
  drug_exposure_end_date TEXT NOT NULL,
  drug_type_concept_id INTEGER NOT NULL,
  visit_occurrence_id INTEGER,
  drug_source_value TEXT
);

CREATE TABLE IF NOT EXISTS specimen (
  specimen_id INTEGER PRIMARY KEY AUTOINCREMENT,
  person_id INTEGER NOT NULL,
  specimen_concept_id INTEGER NOT NULL,
  specimen_type_concept_id INTEGER NOT NULL,
  specimen_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS episode (
  episode_id INTEGER PRIMARY KEY AUTOINCREMENT,
  person_id INTEGER NOT NULL UNIQUE,
  episode_concept_id INTEGER NOT NULL,
  episode_start_date TEXT NOT NULL,
  episode_object_concept_id INTEGER NOT NULL,
  episode_type_concept_id INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS episode_event (
  episode_id INTEGER NOT NULL,
  event_id INTEGER NOT NULL,
  episode_event_field_concept_id INTEGER NOT NULL,
  PRIMARY KEY (episode_id, event_id, episode_event_field_concept_id)
);

CREATE TABLE IF NOT EXISTS fact_relationship (
  domain_concept_id_1 INTEGER NOT NULL,
  fact_id_1 INTEGER NOT NULL,
  domain_concept_id_2 INTEGER NOT NULL,
  fact_id_2 INTEGER NOT NULL,
  relationship_concept_id INTEGER NOT NULL,
  UNIQUE (domain_concept_id_1, fact_id_1, domain_concept_id_2, fact_id_2, relationship_concept_id)
);

CREATE TABLE IF NOT EXISTS care_site (
  care_site_id INTEGER PRIMARY KEY AUTOINCREMENT,
  care_site_name TEXT NOT NULL,
  care_site_source_value TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS person_origin (
  person_id INTEGER PRIMARY KEY AUTOINCREMENT,
  registry TEXT NOT NULL,
  source_person_id TEXT NOT NULL,
  UNIQUE (registry, source_person_id)
);

CREATE TABLE IF NOT EXISTS etl_tracking (
  source_person_id TEXT NOT NULL,
  form_name TEXT NOT NULL,
  processed_date TEXT NOT NULL,
  quality_check TEXT NOT NULL DEFAULT 'valid' CHECK (quality_check IN ('valid', 'invalid')),
  PRIMARY KEY (source_person_id, form_name)
);

CREATE TABLE IF NOT EXISTS culture_origin (
  source_culture_id TEXT NOT NULL,
  culture_measurement_id INTEGER NOT NULL,
  PRIMARY KEY (source_culture_id, culture_measurement_id)
);
";

/// Open (or create) a store file and make sure the schema exists.
pub fn open_store(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).map_err(|source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;",
    )
    .map_err(|source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    ensure_schema(&conn)?;
    Ok(conn)
}

/// In-memory store with the schema applied.
pub fn open_memory_store() -> Result<Connection> {
    let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
        path: ":memory:".into(),
        source,
    })?;
    ensure_schema(&conn)?;
    Ok(conn)
}

pub fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .map_err(|source| StoreError::Schema { source })
}
