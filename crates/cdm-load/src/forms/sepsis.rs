use chrono::NaiveDate;
use cdm_model::concepts::{ADMISSION_DIAGNOSIS, CASE_REPORT_FORM, DISEASE_EPISODE, INFECTIOUS_DISEASE};
use cdm_model::{
    EventField, FormKind, NewCondition, NewEpisode, NewMeasurement, NewObservation, NewProcedure,
    SourceRecord, VisitId,
};
use cdm_standards::NONE_VALUE;
use cdm_store::{facts, queries};
use tracing::debug;

use crate::error::{LoadError, Result};
use crate::scope::SubjectScope;
use crate::values::parse_number;

const FOCUS_FIELD: &str = "foco";

pub(super) fn load_sepsis(scope: &mut SubjectScope<'_>, record: &SourceRecord) -> Result<()> {
    if queries::episode_for_person(scope.conn(), scope.person())?.is_some() {
        return Err(LoadError::DuplicateFact { what: "episode" });
    }
    let admission = scope.admission_date()?;
    let visit = scope.visit()?;

    let default_focus = scope.settings().defaults.focus.as_str();
    for &field in FormKind::Sepsis.fields() {
        let value = match record.get(field) {
            Some(value) => value,
            None if field == FOCUS_FIELD => {
                debug!("empty infection focus, using the default focus");
                default_focus
            }
            None => continue,
        };
        match field {
            "sepsis" | "shock_septico" if value != "0" => {
                write_condition(scope, field, value, admission, visit)?;
            }
            "vasopresores" if value != "0" => {
                let row = NewProcedure {
                    person_id: scope.person(),
                    concept_id: scope.sem(field, value)?,
                    date: admission,
                    type_concept_id: CASE_REPORT_FORM,
                    visit_id: Some(visit),
                    source_value: Some(value.to_string()),
                };
                scope.procedure(&row)?;
            }
            "sepsis" | "shock_septico" | "vasopresores" | "estado_mental_alterado" => {
                let row = NewObservation::new(scope.person(), scope.sem(field, value)?, admission)
                    .with_value_concept(Some(scope.val(field, value)?))
                    .with_value_source(Some(value))
                    .with_source_value(field);
                scope.observation(&row)?;
            }
            FOCUS_FIELD => write_focus(scope, value, admission, visit)?,
            "lactato_serico" => {
                let number = parse_number(field, scope.value_code(field, value)?)?;
                let row = NewMeasurement::new(scope.person(), scope.sem(field, value)?, admission)
                    .with_operator(scope.op(field, value)?)
                    .with_number(number)
                    .with_unit(scope.unit(field, value)?)
                    .with_visit(Some(visit))
                    .with_source(field, Some(value));
                scope.measurement(&row)?;
            }
            _ => {
                let row =
                    NewMeasurement::new(scope.person(), scope.sem(field, NONE_VALUE)?, admission)
                        .with_number(parse_number(field, value)?)
                        .with_unit(scope.unit(field, NONE_VALUE)?)
                        .with_visit(Some(visit))
                        .with_source(field, Some(value));
                scope.measurement(&row)?;
            }
        }
    }
    Ok(())
}

fn write_condition(
    scope: &mut SubjectScope<'_>,
    field: &str,
    value: &str,
    date: NaiveDate,
    visit: VisitId,
) -> Result<()> {
    let row = NewCondition::new(scope.person(), scope.sem(field, value)?, date)
        .with_visit(Some(visit))
        .with_source_value(Some(value));
    scope.condition(&row)?;
    Ok(())
}

/// The focus condition opens the subject's infectious-disease episode.
fn write_focus(
    scope: &mut SubjectScope<'_>,
    focus: &str,
    date: NaiveDate,
    visit: VisitId,
) -> Result<()> {
    let condition = NewCondition::new(scope.person(), scope.sem(FOCUS_FIELD, focus)?, date)
        .with_status(ADMISSION_DIAGNOSIS)
        .with_visit(Some(visit))
        .with_source_value(Some(focus));
    let condition = scope.condition(&condition)?;

    let episode = facts::insert_episode(
        scope.conn(),
        &NewEpisode {
            person_id: scope.person(),
            concept_id: DISEASE_EPISODE,
            start_date: date,
            type_concept_id: CASE_REPORT_FORM,
            object_concept_id: INFECTIOUS_DISEASE,
        },
    )?;
    scope.tally_mut().episodes += 1;
    scope.remember_episode(episode);
    scope.attach_to_episode(condition, EventField::Condition)
}
