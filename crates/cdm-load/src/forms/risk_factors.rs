use cdm_model::{FormKind, NewObservation, SourceRecord};

use crate::error::Result;
use crate::scope::SubjectScope;

pub(super) fn load_risk_factors(scope: &mut SubjectScope<'_>, record: &SourceRecord) -> Result<()> {
    let admission = scope.admission_date()?;
    for &field in FormKind::RiskFactors.fields() {
        let Some(value) = record.get(field) else {
            continue;
        };
        let row = NewObservation::new(scope.person(), scope.sem(field, value)?, admission)
            .with_value_concept(Some(scope.val(field, value)?))
            .with_value_source(Some(value))
            .with_source_value(field);
        scope.observation(&row)?;
    }
    Ok(())
}
