use cdm_model::{NewCondition, SourceRecord};

use super::common::required;
use crate::error::Result;
use crate::scope::SubjectScope;
use crate::values::{parse_days, shift_days};

const SYMPTOM_FIELD: &str = "sintoma";
const DURATION_FIELD: &str = "duracion_sintoma";

/// A symptom starts `duracion_sintoma` days before admission.
pub(super) fn load_symptoms(scope: &mut SubjectScope<'_>, record: &SourceRecord) -> Result<()> {
    let symptom = required(record, SYMPTOM_FIELD)?;
    let days = record
        .get(DURATION_FIELD)
        .map(|raw| parse_days(DURATION_FIELD, raw))
        .transpose()?
        .unwrap_or(0);
    let admission = scope.admission_date()?;
    let visit = scope.visit()?;
    let start = shift_days(DURATION_FIELD, admission, -days)?;

    let row = NewCondition::new(scope.person(), scope.sem(SYMPTOM_FIELD, symptom)?, start)
        .with_visit(Some(visit))
        .with_source_value(Some(symptom));
    scope.condition(&row)?;
    Ok(())
}
