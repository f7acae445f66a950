//! Typed inserts. Each insert that creates an addressable row returns its id.

use cdm_model::{
    CareSiteId, ConceptId, EpisodeId, FactId, FactRelationship, NewCondition, NewDrugExposure,
    NewEpisode, NewEpisodeEvent, NewMeasurement, NewObservation, NewObservationPeriod, NewPerson,
    NewProcedure, NewSpecimen, NewVisit, PersonId, VisitId,
};
use rusqlite::{Connection, params};

use crate::error::{Result, StoreError};

fn concept(id: Option<ConceptId>) -> Option<i64> {
    id.map(ConceptId::get)
}

fn visit(id: Option<VisitId>) -> Option<i64> {
    id.map(VisitId::get)
}

pub fn insert_person(conn: &Connection, person: &NewPerson) -> Result<PersonId> {
    conn.execute(
        "INSERT INTO person (person_id, gender_concept_id, year_of_birth, birth_datetime,
         race_concept_id, ethnicity_concept_id, care_site_id, person_source_value, gender_source_value)
         VALUES (?1, ?2, ?3, ?4, 0, 0, ?5, ?6, ?7)",
        params![
            person.person_id.get(),
            person.gender_concept_id.get(),
            person.year_of_birth,
            person.birth_date,
            person.care_site_id.map(CareSiteId::get),
            person.person_source_value,
            person.gender_source_value,
        ],
    )
    .map_err(StoreError::write("person"))?;
    Ok(person.person_id)
}

pub fn insert_visit(conn: &Connection, row: &NewVisit) -> Result<VisitId> {
    conn.execute(
        "INSERT INTO visit_occurrence (person_id, visit_concept_id, visit_start_date,
         visit_end_date, visit_type_concept_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            row.person_id.get(),
            row.visit_concept_id.get(),
            row.start_date,
            row.end_date,
            row.type_concept_id.get(),
        ],
    )
    .map_err(StoreError::write("visit_occurrence"))?;
    Ok(VisitId::new(conn.last_insert_rowid()))
}

pub fn insert_observation_period(conn: &Connection, row: &NewObservationPeriod) -> Result<()> {
    conn.execute(
        "INSERT INTO observation_period (person_id, observation_period_start_date,
         observation_period_end_date, period_type_concept_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            row.person_id.get(),
            row.start_date,
            row.end_date,
            row.type_concept_id.get(),
        ],
    )
    .map_err(StoreError::write("observation_period"))?;
    Ok(())
}

pub fn insert_condition(conn: &Connection, row: &NewCondition) -> Result<FactId> {
    conn.execute(
        "INSERT INTO condition_occurrence (person_id, condition_concept_id, condition_start_date,
         condition_type_concept_id, condition_status_concept_id, visit_occurrence_id,
         condition_source_value)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            row.person_id.get(),
            row.concept_id.get(),
            row.start_date,
            row.type_concept_id.get(),
            concept(row.status_concept_id),
            visit(row.visit_id),
            row.source_value,
        ],
    )
    .map_err(StoreError::write("condition_occurrence"))?;
    Ok(FactId::new(conn.last_insert_rowid()))
}

pub fn insert_measurement(conn: &Connection, row: &NewMeasurement) -> Result<FactId> {
    conn.execute(
        "INSERT INTO measurement (person_id, measurement_concept_id, measurement_date,
         measurement_type_concept_id, operator_concept_id, value_as_number, value_as_concept_id,
         unit_concept_id, visit_occurrence_id, measurement_source_value, value_source_value,
         measurement_event_id, meas_event_field_concept_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            row.person_id.get(),
            row.concept_id.get(),
            row.date,
            row.type_concept_id.get(),
            concept(row.operator_concept_id),
            row.value_as_number,
            concept(row.value_as_concept_id),
            concept(row.unit_concept_id),
            visit(row.visit_id),
            row.source_value,
            row.value_source_value,
            row.event.map(|event| event.id.get()),
            row.event.map(|event| event.field.concept().get()),
        ],
    )
    .map_err(StoreError::write("measurement"))?;
    Ok(FactId::new(conn.last_insert_rowid()))
}

pub fn insert_observation(conn: &Connection, row: &NewObservation) -> Result<FactId> {
    conn.execute(
        "INSERT INTO observation (person_id, observation_concept_id, observation_date,
         observation_type_concept_id, value_as_number, value_as_concept_id, qualifier_concept_id,
         visit_occurrence_id, observation_source_value, value_source_value,
         observation_event_id, obs_event_field_concept_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            row.person_id.get(),
            row.concept_id.get(),
            row.date,
            row.type_concept_id.get(),
            row.value_as_number,
            concept(row.value_as_concept_id),
            concept(row.qualifier_concept_id),
            visit(row.visit_id),
            row.source_value,
            row.value_source_value,
            row.event.map(|event| event.id.get()),
            row.event.map(|event| event.field.concept().get()),
        ],
    )
    .map_err(StoreError::write("observation"))?;
    Ok(FactId::new(conn.last_insert_rowid()))
}

pub fn insert_procedure(conn: &Connection, row: &NewProcedure) -> Result<FactId> {
    conn.execute(
        "INSERT INTO procedure_occurrence (person_id, procedure_concept_id, procedure_date,
         procedure_type_concept_id, visit_occurrence_id, procedure_source_value)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            row.person_id.get(),
            row.concept_id.get(),
            row.date,
            row.type_concept_id.get(),
            visit(row.visit_id),
            row.source_value,
        ],
    )
    .map_err(StoreError::write("procedure_occurrence"))?;
    Ok(FactId::new(conn.last_insert_rowid()))
}

pub fn insert_drug_exposure(conn: &Connection, row: &NewDrugExposure) -> Result<FactId> {
    conn.execute(
        "INSERT INTO drug_exposure (person_id, drug_concept_id, drug_exposure_start_date,
         drug_exposure_end_date, drug_type_concept_id, visit_occurrence_id, drug_source_value)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            row.person_id.get(),
            row.concept_id.get(),
            row.start_date,
            row.end_date,
            row.type_concept_id.get(),
            visit(row.visit_id),
            row.source_value,
        ],
    )
    .map_err(StoreError::write("drug_exposure"))?;
    Ok(FactId::new(conn.last_insert_rowid()))
}

pub fn insert_specimen(conn: &Connection, row: &NewSpecimen) -> Result<FactId> {
    conn.execute(
        "INSERT INTO specimen (person_id, specimen_concept_id, specimen_type_concept_id, specimen_date)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            row.person_id.get(),
            row.concept_id.get(),
            row.type_concept_id.get(),
            row.date,
        ],
    )
    .map_err(StoreError::write("specimen"))?;
    Ok(FactId::new(conn.last_insert_rowid()))
}

pub fn insert_episode(conn: &Connection, row: &NewEpisode) -> Result<EpisodeId> {
    conn.execute(
        "INSERT INTO episode (person_id, episode_concept_id, episode_start_date,
         episode_object_concept_id, episode_type_concept_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            row.person_id.get(),
            row.concept_id.get(),
            row.start_date,
            row.object_concept_id.get(),
            row.type_concept_id.get(),
        ],
    )
    .map_err(StoreError::write("episode"))?;
    Ok(EpisodeId::new(conn.last_insert_rowid()))
}

pub fn insert_episode_event(conn: &Connection, row: &NewEpisodeEvent) -> Result<()> {
    conn.execute(
        "INSERT INTO episode_event (episode_id, event_id, episode_event_field_concept_id)
         VALUES (?1, ?2, ?3)",
        params![
            row.episode_id.get(),
            row.event_id.get(),
            row.field.concept().get(),
        ],
    )
    .map_err(StoreError::write("episode_event"))?;
    Ok(())
}

pub fn insert_fact_relationship(conn: &Connection, row: &FactRelationship) -> Result<()> {
    conn.execute(
        "INSERT INTO fact_relationship (domain_concept_id_1, fact_id_1, domain_concept_id_2,
         fact_id_2, relationship_concept_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            row.domain_1.concept().get(),
            row.fact_1.get(),
            row.domain_2.concept().get(),
            row.fact_2.get(),
            row.relationship_concept_id.get(),
        ],
    )
    .map_err(StoreError::write("fact_relationship"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use cdm_model::{EventField, EventLink, concepts};

    use super::*;
    use crate::schema::open_memory_store;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn measurement_carries_event_link() {
        let conn = open_memory_store().expect("store");
        let specimen = insert_specimen(
            &conn,
            &NewSpecimen {
                person_id: PersonId::new(1),
                concept_id: ConceptId::new(4001225),
                date: date(2024, 3, 1),
                type_concept_id: concepts::CASE_REPORT_FORM,
            },
        )
        .expect("specimen");
        let culture = NewMeasurement::new(PersonId::new(1), ConceptId::new(3023368), date(2024, 3, 1))
            .with_value_concept(ConceptId::new(9191))
            .with_event(EventLink::new(specimen, EventField::Specimen));
        let id = insert_measurement(&conn, &culture).expect("measurement");

        let (event_id, field, day): (i64, i64, NaiveDate) = conn
            .query_row(
                "SELECT measurement_event_id, meas_event_field_concept_id, measurement_date
                 FROM measurement WHERE measurement_id = ?1",
                [id.get()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .expect("row");
        assert_eq!(event_id, specimen.get());
        assert_eq!(field, 1147051);
        assert_eq!(day, date(2024, 3, 1));
    }

    #[test]
    fn second_visit_for_person_is_a_write_failure() {
        let conn = open_memory_store().expect("store");
        let visit = NewVisit {
            person_id: PersonId::new(1),
            visit_concept_id: concepts::EMERGENCY_ROOM_VISIT,
            start_date: date(2024, 3, 1),
            end_date: date(2024, 3, 1),
            type_concept_id: concepts::CASE_REPORT_FORM,
        };
        insert_visit(&conn, &visit).expect("first visit");
        let error = insert_visit(&conn, &visit).unwrap_err();
        assert!(matches!(
            error,
            StoreError::WriteFailure {
                table: "visit_occurrence",
                ..
            }
        ));
    }
}
