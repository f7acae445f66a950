//! Cultures drawn in the emergency department.
//!
//! Every fact joins the sepsis episode: the specimen and the culture under
//! their own roles, then the organism chain.

use cdm_model::concepts::CASE_REPORT_FORM;
use cdm_model::{EventField, EventLink, NewMeasurement, NewSpecimen, SourceRecord};
use cdm_standards::NONE_VALUE;
use cdm_store::registries;

use super::common::date_or_admission;
use super::microbiology::{ChainFields, Placement, write_organism_chain};
use crate::error::Result;
use crate::scope::SubjectScope;

const BLOOD_CHAIN: ChainFields = ChainFields {
    organism: "microorganismo",
    resistance: "bmr_etiologia",
    phenotypes: "fenotipo_resistencia",
};

const OTHER_CHAIN: ChainFields = ChainFields {
    organism: "microorganismo_otros_cult",
    resistance: "bmr_etiologia_otros",
    phenotypes: "fenotipo_resistencia_otros",
};

const BLOOD_RESULT_FIELD: &str = "hemo_positivo_si_no";
const POSITIVE: &str = "1";
const CULTURE_TYPE_FIELD: &str = "tipo_cultivo";

pub(super) fn load_blood_culture(scope: &mut SubjectScope<'_>, record: &SourceRecord) -> Result<()> {
    let visit = scope.visit()?;
    scope.episode()?;
    let date = date_or_admission(scope, record, "fecha_hemocultivo")?;

    let specimen = NewSpecimen {
        person_id: scope.person(),
        concept_id: scope.sem("especimen_hemocultivo_urg", NONE_VALUE)?,
        date,
        type_concept_id: CASE_REPORT_FORM,
    };
    let specimen = scope.specimen(&specimen)?;
    scope.attach_to_episode(specimen, EventField::Specimen)?;

    let result = record.get(BLOOD_RESULT_FIELD);
    let culture = NewMeasurement::new(
        scope.person(),
        scope.sem(BLOOD_RESULT_FIELD, NONE_VALUE)?,
        date,
    )
    .with_value_concept(scope.val(BLOOD_RESULT_FIELD, result.unwrap_or(NONE_VALUE))?)
    .with_event(EventLink::new(specimen, EventField::Specimen))
    .with_visit(Some(visit))
    .with_source(BLOOD_RESULT_FIELD, result);
    let culture = scope.measurement(&culture)?;
    if let Some(source_id) = record.get("id_hemocultivo") {
        registries::record_culture_origin(scope.conn(), source_id, culture)?;
    }
    scope.attach_to_episode(culture, EventField::Measurement)?;

    if result == Some(POSITIVE) {
        write_organism_chain(
            scope,
            record,
            BLOOD_CHAIN,
            culture,
            date,
            Placement::admission(visit),
        )?;
    }
    Ok(())
}

/// Only positive non-blood cultures are exported, so the organism chain is
/// always written.
pub(super) fn load_other_culture(scope: &mut SubjectScope<'_>, record: &SourceRecord) -> Result<()> {
    let visit = scope.visit()?;
    scope.episode()?;
    let date = date_or_admission(scope, record, "fecha_otros_cultivos")?;
    let culture_type = record.get(CULTURE_TYPE_FIELD);
    let type_key = culture_type.unwrap_or(NONE_VALUE);

    let specimen = NewSpecimen {
        person_id: scope.person(),
        concept_id: scope.sem("especimen_otros_cultivos_urg", type_key)?,
        date,
        type_concept_id: CASE_REPORT_FORM,
    };
    let specimen = scope.specimen(&specimen)?;
    scope.attach_to_episode(specimen, EventField::Specimen)?;

    let culture = NewMeasurement::new(scope.person(), scope.sem(CULTURE_TYPE_FIELD, type_key)?, date)
        .with_value_concept(scope.val(CULTURE_TYPE_FIELD, NONE_VALUE)?)
        .with_event(EventLink::new(specimen, EventField::Specimen))
        .with_visit(Some(visit))
        .with_source(CULTURE_TYPE_FIELD, culture_type);
    let culture = scope.measurement(&culture)?;
    scope.attach_to_episode(culture, EventField::Measurement)?;

    write_organism_chain(
        scope,
        record,
        OTHER_CHAIN,
        culture,
        date,
        Placement::admission(visit),
    )?;
    Ok(())
}
