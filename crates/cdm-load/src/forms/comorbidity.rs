use cdm_model::{ConceptId, FormKind, NewMeasurement, NewObservation, SourceRecord};
use cdm_standards::NONE_VALUE;

use crate::error::Result;
use crate::scope::SubjectScope;
use crate::values::parse_number;

/// Scores recorded as measurements rather than history observations.
const SCORES: [&str; 2] = ["escala_karnofsky", "indice_de_charlson"];

const LIVER_DISEASE: &str = "hepatopatia";
const LIVER_DISEASE_TYPE: &str = "tipo_hepatopatia";
const CANCER_TYPE: &str = "tipo_cancer";
const IMMUNOSUPPRESSION_CAUSE: &str = "causa_inmunosupresion";

/// SNOMED severity qualifiers for liver disease, keyed by the `hepatopatia` answer.
const LIVER_SEVERITY: [(&str, &str); 2] = [("1", "255604002"), ("3", "371924009")];

pub(super) fn load_comorbidity(scope: &mut SubjectScope<'_>, record: &SourceRecord) -> Result<()> {
    let admission = scope.admission_date()?;
    let person = scope.person();
    for &field in FormKind::Comorbidity.fields() {
        let Some(value) = record.get(field) else {
            continue;
        };

        if SCORES.contains(&field) {
            let row = NewMeasurement::new(person, scope.sem(field, NONE_VALUE)?, admission)
                .with_number(parse_number(field, value)?)
                .with_unit(scope.unit(field, NONE_VALUE)?)
                .with_source(field, Some(value));
            scope.measurement(&row)?;
            continue;
        }

        let (concept, value_concept, qualifier) = if field == LIVER_DISEASE_TYPE {
            (
                scope.sem(field, NONE_VALUE)?,
                scope.val(field, value)?,
                liver_severity(scope, record.get(LIVER_DISEASE))?,
            )
        } else if value == "0" {
            (scope.sem(field, "0")?, scope.val(field, "0")?, None)
        } else if field == CANCER_TYPE {
            (
                scope.sem(field, NONE_VALUE)?,
                scope.resolver().standard_concept("ICD10CM", value)?,
                None,
            )
        } else if field == IMMUNOSUPPRESSION_CAUSE {
            (scope.sem(field, NONE_VALUE)?, scope.val(field, value)?, None)
        } else {
            (scope.sem(field, value)?, scope.val(field, value)?, None)
        };

        let row = NewObservation::new(person, concept, admission)
            .with_value_concept(Some(value_concept))
            .with_qualifier(qualifier)
            .with_value_source(Some(value))
            .with_source_value(field);
        scope.observation(&row)?;
    }
    Ok(())
}

fn liver_severity(scope: &SubjectScope<'_>, answer: Option<&str>) -> Result<Option<ConceptId>> {
    let Some(code) = LIVER_SEVERITY
        .iter()
        .find(|(key, _)| Some(*key) == answer)
        .map(|(_, code)| *code)
    else {
        return Ok(None);
    };
    Ok(Some(scope.resolver().standard_concept("SNOMED", code)?))
}
