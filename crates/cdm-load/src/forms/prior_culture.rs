//! Infections and colonizations from before the admission.
//!
//! Both forms write a history fact, the specimen and culture it was found
//! in, and the organism chain, then link the history fact to the organism.
//! None of these facts belong to the visit.

use chrono::NaiveDate;
use cdm_model::concepts::CASE_REPORT_FORM;
use cdm_model::{
    EventField, EventLink, FactId, NewCondition, NewMeasurement, NewObservation, NewSpecimen,
    RelationshipKind, SourceRecord,
};
use cdm_standards::NONE_VALUE;

use super::common::date_or_before_admission;
use super::microbiology::{ChainFields, Placement, write_organism_chain};
use crate::error::Result;
use crate::scope::SubjectScope;

const INFECTION_CHAIN: ChainFields = ChainFields {
    organism: "microorganism_infec_prev",
    resistance: "bmr_infec_previa",
    phenotypes: "feno_resist_infec_prev",
};

const COLONIZATION_CHAIN: ChainFields = ChainFields {
    organism: "microorganismo_colonizador",
    resistance: "bmr_colonizador",
    phenotypes: "fenotipo_resist_colo",
};

const SYNDROME_FIELD: &str = "sindrome_infeccioso";
const CARRIER_FIELD: &str = "portador_agente_infeccioso";

pub(super) fn load_prior_infection(
    scope: &mut SubjectScope<'_>,
    record: &SourceRecord,
) -> Result<()> {
    let lookback = scope.settings().defaults.prior_infection_lookback_days;
    let date = date_or_before_admission(scope, record, "fecha_infeccion", lookback)?;

    let syndrome = record.get(SYNDROME_FIELD);
    let syndrome_code = syndrome.unwrap_or(scope.settings().defaults.syndrome.as_str());
    let condition = NewCondition::new(scope.person(), scope.sem(SYNDROME_FIELD, syndrome_code)?, date)
        .with_source_value(syndrome);
    let condition = scope.condition(&condition)?;

    let organism = write_culture_history(
        scope,
        record,
        date,
        "especimen_infecciones_previas",
        "cultivo_infecciones_previas",
        INFECTION_CHAIN,
    )?;
    scope.link(RelationshipKind::PreviousInfection, condition, organism)
}

pub(super) fn load_prior_colonization(
    scope: &mut SubjectScope<'_>,
    record: &SourceRecord,
) -> Result<()> {
    let lookback = scope.settings().defaults.prior_infection_lookback_days;
    let date = date_or_before_admission(scope, record, "fecha_colonizacion", lookback)?;

    let carrier = NewObservation::new(scope.person(), scope.sem(CARRIER_FIELD, NONE_VALUE)?, date)
        .with_value_source(Some(CARRIER_FIELD));
    let carrier = scope.observation(&carrier)?;

    let organism = write_culture_history(
        scope,
        record,
        date,
        "especimen_coloniza_previas",
        "cultivo_colonizaciones_previas",
        COLONIZATION_CHAIN,
    )?;
    scope.link(RelationshipKind::PreviousColonization, carrier, organism)
}

/// Specimen, culture and organism chain. Returns the organism observation.
fn write_culture_history(
    scope: &mut SubjectScope<'_>,
    record: &SourceRecord,
    date: NaiveDate,
    specimen_field: &str,
    culture_field: &str,
    chain: ChainFields,
) -> Result<FactId> {
    let specimen = NewSpecimen {
        person_id: scope.person(),
        concept_id: scope.sem(specimen_field, NONE_VALUE)?,
        date,
        type_concept_id: CASE_REPORT_FORM,
    };
    let specimen = scope.specimen(&specimen)?;

    let culture = NewMeasurement::new(scope.person(), scope.sem(culture_field, NONE_VALUE)?, date)
        .with_value_concept(scope.val(culture_field, NONE_VALUE)?)
        .with_event(EventLink::new(specimen, EventField::Specimen))
        .with_source(culture_field, record.get(culture_field));
    let culture = scope.measurement(&culture)?;

    write_organism_chain(scope, record, chain, culture, date, Placement::HISTORY)
}
