//! Vital signs.
//!
//! The form pairs each continuous reading with a categorical flag. A reading
//! becomes a measurement; a flag becomes a condition. When the flag was left
//! empty it is derived from the reading with the thresholds below, and when
//! only the temperature flag was answered it also stands in for the missing
//! temperature measurement.

use chrono::NaiveDate;
use cdm_model::{NewCondition, NewMeasurement, NewObservation, SourceRecord, VisitId};
use cdm_standards::NONE_VALUE;

use crate::error::Result;
use crate::scope::SubjectScope;
use crate::values::parse_number;

/// Flag code for a reading inside the normal range.
pub const NORMAL: &str = "0";

/// Cut-off that turns a reading into a flag code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// Below `low` is `"1"`, above `high` is `"2"`.
    Outside { low: f64, high: f64 },
    /// Strictly above the limit is `"1"`.
    Above(f64),
    /// At or above the limit is `"1"`.
    AtLeast(f64),
    /// At or below the limit is `"1"`.
    AtMost(f64),
}

impl Threshold {
    pub fn derive_flag(self, value: f64) -> &'static str {
        match self {
            Threshold::Outside { low, .. } if value < low => "1",
            Threshold::Outside { high, .. } if value > high => "2",
            Threshold::Outside { .. } => NORMAL,
            Threshold::Above(limit) if value > limit => "1",
            Threshold::AtLeast(limit) if value >= limit => "1",
            Threshold::AtMost(limit) if value <= limit => "1",
            Threshold::Above(_) | Threshold::AtLeast(_) | Threshold::AtMost(_) => NORMAL,
        }
    }
}

/// Where a normal flag is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalRoute {
    /// A condition like any other flag value.
    Condition,
    /// An observation with a value concept, outside the visit.
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalSign {
    pub reading: &'static str,
    pub flag: &'static str,
    pub threshold: Threshold,
    pub normal_route: NormalRoute,
    /// The flag alone carries enough to write a measurement of the reading.
    pub categorical_reading: bool,
}

impl VitalSign {
    /// Whether `flag` is written as an observation instead of a condition.
    /// Only a normal flag on an observation-routed sign is; an abnormal
    /// flag is always a condition.
    pub fn routes_to_observation(&self, flag: &str) -> bool {
        flag == NORMAL && self.normal_route == NormalRoute::Observation
    }
}

pub const VITAL_SIGNS: [VitalSign; 5] = [
    VitalSign {
        reading: "temperatura",
        flag: "hipotermia_hipertermia",
        threshold: Threshold::Outside {
            low: 36.0,
            high: 38.0,
        },
        normal_route: NormalRoute::Condition,
        categorical_reading: true,
    },
    VitalSign {
        reading: "frec_cardiaca",
        flag: "taquicardia",
        threshold: Threshold::Above(90.0),
        normal_route: NormalRoute::Condition,
        categorical_reading: false,
    },
    VitalSign {
        reading: "frec_respiratoria",
        flag: "taquipnea",
        threshold: Threshold::AtLeast(22.0),
        normal_route: NormalRoute::Condition,
        categorical_reading: false,
    },
    VitalSign {
        reading: "tension_arterial",
        flag: "hipotension",
        threshold: Threshold::AtMost(100.0),
        normal_route: NormalRoute::Condition,
        categorical_reading: false,
    },
    VitalSign {
        reading: "saturacion_o2",
        flag: "hipoxemia",
        threshold: Threshold::AtMost(94.0),
        normal_route: NormalRoute::Observation,
        categorical_reading: false,
    },
];

pub(super) fn load_vital_signs(scope: &mut SubjectScope<'_>, record: &SourceRecord) -> Result<()> {
    let admission = scope.admission_date()?;
    let visit = scope.visit()?;
    for sign in &VITAL_SIGNS {
        match (record.get(sign.reading), record.get(sign.flag)) {
            (None, None) => {}
            (Some(raw), answered) => {
                let value = parse_number(sign.reading, raw)?;
                let row = NewMeasurement::new(
                    scope.person(),
                    scope.sem(sign.reading, NONE_VALUE)?,
                    admission,
                )
                .with_number(value)
                .with_unit(scope.unit(sign.reading, NONE_VALUE)?)
                .with_visit(Some(visit))
                .with_source(sign.reading, Some(raw));
                scope.measurement(&row)?;
                let flag = answered.unwrap_or_else(|| sign.threshold.derive_flag(value));
                write_flag(scope, sign, flag, admission, visit)?;
            }
            (None, Some(flag)) => {
                if sign.categorical_reading {
                    write_categorical_reading(scope, sign, flag, admission, visit)?;
                }
                write_flag(scope, sign, flag, admission, visit)?;
            }
        }
    }
    Ok(())
}

fn write_flag(
    scope: &mut SubjectScope<'_>,
    sign: &VitalSign,
    flag: &str,
    date: NaiveDate,
    visit: VisitId,
) -> Result<()> {
    let concept = scope.sem(sign.flag, flag)?;
    if sign.routes_to_observation(flag) {
        let row = NewObservation::new(scope.person(), concept, date)
            .with_value_concept(Some(scope.val(sign.flag, flag)?))
            .with_value_source(Some(flag))
            .with_source_value(sign.flag);
        scope.observation(&row)?;
        return Ok(());
    }
    let row = NewCondition::new(scope.person(), concept, date)
        .with_visit(Some(visit))
        .with_source_value(Some(flag));
    scope.condition(&row)?;
    Ok(())
}

/// A measurement of the reading built from the flag's operator, coded value and unit.
fn write_categorical_reading(
    scope: &mut SubjectScope<'_>,
    sign: &VitalSign,
    flag: &str,
    date: NaiveDate,
    visit: VisitId,
) -> Result<()> {
    let value = parse_number(sign.flag, scope.value_code(sign.flag, flag)?)?;
    let row = NewMeasurement::new(scope.person(), scope.sem(sign.reading, NONE_VALUE)?, date)
        .with_operator(scope.op(sign.flag, flag)?)
        .with_number(value)
        .with_unit(scope.unit(sign.flag, flag)?)
        .with_visit(Some(visit))
        .with_source(sign.flag, Some(flag));
    scope.measurement(&row)?;
    Ok(())
}
