use chrono::Datelike;
use cdm_model::concepts::{CASE_REPORT_FORM, EMERGENCY_ROOM_VISIT};
use cdm_model::{NewObservation, NewObservationPeriod, NewPerson, NewVisit, SourceRecord};
use cdm_standards::NONE_VALUE;
use cdm_store::{facts, queries};
use tracing::debug;

use super::common::required;
use crate::error::{LoadError, Result};
use crate::scope::{ADMISSION_FIELD, SubjectScope};
use crate::values::{parse_date, parse_number};

const BIRTH_FIELD: &str = "fecha_nacimiento";
const SEX_FIELD: &str = "sexo";
const POSTAL_CODE_FIELD: &str = "codigo_postal";

/// Intake answers stored as coded observations.
const CODED_ANSWERS: [&str; 2] = ["paciente_residencia", "mujer_gestante"];

pub(super) fn load_patient(scope: &mut SubjectScope<'_>, record: &SourceRecord) -> Result<()> {
    let conn = scope.conn();
    let person_id = scope.person();
    if queries::visit_for_person(conn, person_id)?.is_some() {
        return Err(LoadError::DuplicateFact { what: "visit" });
    }

    let admission_raw = required(record, ADMISSION_FIELD)?;
    let admission = parse_date(ADMISSION_FIELD, admission_raw)?;
    let birth = parse_date(BIRTH_FIELD, required(record, BIRTH_FIELD)?)?;
    let sex = record.get(SEX_FIELD);

    let site_code = scope.subject().site_code();
    let care_site_id = queries::care_site_id(conn, site_code)?;
    if care_site_id.is_none() {
        debug!(site = site_code, "no care site registered for subject prefix");
    }

    facts::insert_person(
        conn,
        &NewPerson {
            person_id,
            gender_concept_id: scope.sem(SEX_FIELD, sex.unwrap_or(NONE_VALUE))?,
            year_of_birth: birth.year(),
            birth_date: birth,
            care_site_id,
            person_source_value: scope.subject().as_str().to_string(),
            gender_source_value: sex.map(str::to_string),
        },
    )?;
    scope.tally_mut().persons += 1;

    let visit = facts::insert_visit(
        conn,
        &NewVisit {
            person_id,
            visit_concept_id: EMERGENCY_ROOM_VISIT,
            start_date: admission,
            end_date: admission,
            type_concept_id: CASE_REPORT_FORM,
        },
    )?;
    scope.tally_mut().visits += 1;
    scope.remember_visit(visit);

    let admission_row = NewObservation::new(person_id, scope.admission_concept()?, admission)
        .with_value_source(Some(admission_raw))
        .with_visit(Some(visit));
    scope.observation(&admission_row)?;
    scope.remember_admission(admission);

    if let Some(raw) = record.get(POSTAL_CODE_FIELD) {
        let row = NewObservation::new(
            person_id,
            scope.sem(POSTAL_CODE_FIELD, NONE_VALUE)?,
            admission,
        )
        .with_number(parse_number(POSTAL_CODE_FIELD, raw)?)
        .with_value_source(Some(raw))
        .with_visit(Some(visit));
        scope.observation(&row)?;
    }

    for field in CODED_ANSWERS {
        let Some(value) = record.get(field) else {
            continue;
        };
        let row = NewObservation::new(person_id, scope.sem(field, NONE_VALUE)?, admission)
            .with_value_concept(Some(scope.val(field, value)?))
            .with_value_source(Some(value))
            .with_visit(Some(visit));
        scope.observation(&row)?;
    }

    facts::insert_observation_period(
        conn,
        &NewObservationPeriod {
            person_id,
            start_date: birth,
            end_date: admission,
            type_concept_id: CASE_REPORT_FORM,
        },
    )?;
    Ok(())
}
