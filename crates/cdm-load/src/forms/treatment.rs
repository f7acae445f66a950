use cdm_model::concepts::CASE_REPORT_FORM;
use cdm_model::{ConceptId, EventField, NewDrugExposure, SourceRecord};
use tracing::warn;

use super::common::date_or_before_admission;
use crate::error::Result;
use crate::scope::SubjectScope;
use crate::values::{parse_days, shift_days};

const PRIOR_DRUG_FIELD: &str = "antimicrobiano_previo";
const PRIOR_DAYS_FIELD: &str = "dias_trat_antimicrobiano";
const EMPIRICAL_DRUG_FIELD: &str = "antimicrobiano_empirico";

/// RxNorm concept for an ATC code, or the generic antimicrobial when the
/// code is empty or has no translation.
fn drug_concept(scope: &SubjectScope<'_>, field: &str, atc_code: Option<&str>) -> Result<ConceptId> {
    match atc_code.map(|code| scope.resolver().translate_drug(code)) {
        Some(Ok(concept)) => return Ok(concept),
        Some(Err(_)) => warn!(field, "ATC code has no RxNorm mapping, using the default antimicrobial"),
        None => warn!(field, "no antimicrobial recorded, using the default antimicrobial"),
    }
    let code = scope.settings().defaults.antimicrobial.as_str();
    Ok(scope.resolver().standard_concept("SNOMED", code)?)
}

pub(super) fn load_prior_treatment(
    scope: &mut SubjectScope<'_>,
    record: &SourceRecord,
) -> Result<()> {
    let defaults = &scope.settings().defaults;
    let start = date_or_before_admission(
        scope,
        record,
        "fecha_administracion_antib",
        defaults.prior_treatment_lookback_days,
    )?;
    let days = record
        .get(PRIOR_DAYS_FIELD)
        .map(|raw| parse_days(PRIOR_DAYS_FIELD, raw))
        .transpose()?
        .unwrap_or(defaults.prior_treatment_days);
    let end = shift_days(PRIOR_DAYS_FIELD, start, days.max(1) - 1)?;

    let atc_code = record.get(PRIOR_DRUG_FIELD);
    let row = NewDrugExposure {
        person_id: scope.person(),
        concept_id: drug_concept(scope, PRIOR_DRUG_FIELD, atc_code)?,
        start_date: start,
        end_date: end,
        type_concept_id: CASE_REPORT_FORM,
        visit_id: None,
        source_value: atc_code.map(str::to_string),
    };
    scope.drug_exposure(&row)?;
    Ok(())
}

pub(super) fn load_empirical_treatment(
    scope: &mut SubjectScope<'_>,
    record: &SourceRecord,
) -> Result<()> {
    let admission = scope.admission_date()?;
    let visit = scope.visit()?;
    scope.episode()?;

    let atc_code = record.get(EMPIRICAL_DRUG_FIELD);
    let row = NewDrugExposure {
        person_id: scope.person(),
        concept_id: drug_concept(scope, EMPIRICAL_DRUG_FIELD, atc_code)?,
        start_date: admission,
        end_date: admission,
        type_concept_id: CASE_REPORT_FORM,
        visit_id: Some(visit),
        source_value: atc_code.map(str::to_string),
    };
    let exposure = scope.drug_exposure(&row)?;
    scope.attach_to_episode(exposure, EventField::Drug)
}
