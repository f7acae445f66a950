//! Per-form transformation rules.
//!
//! Each source form has one rule that turns a validated record into CDM
//! facts. Rules run inside the transaction of their (subject, form) group
//! and reach the store only through [`SubjectScope`].
//!
//! | Form | Rule | Needs |
//! |------|------|-------|
//! | `paciente` | person, ER visit, intake observations, observation period | - |
//! | `sintomas` | symptom conditions dated back from admission | visit, admission |
//! | `signos` | vital-sign measurements and derived flags | visit, admission |
//! | `comorbilidad` | history observations, Karnofsky and Charlson scores | admission |
//! | `sepsis` | focus condition, episode, SOFA and qSOFA items | visit, admission |
//! | `factores_de_riesgo_...` | risk-factor observations | admission |
//! | `infecciones_previas` | condition, specimen, culture, organism chain | admission when undated |
//! | `colonizaciones_previas` | observation, specimen, culture, organism chain | admission when undated |
//! | `tratamiento_antibiotico_previo` | drug exposure | admission when undated |
//! | `tratamiento_empirico` | drug exposure on the episode | visit, admission, episode |
//! | `hemocultivo_de_urgencias` | specimen, culture, organism chain on the episode | visit, episode |
//! | `otros_cultivos_en_urgencias` | specimen, culture, organism chain on the episode | visit, episode |

mod common;
mod comorbidity;
mod culture;
mod microbiology;
mod patient;
mod prior_culture;
mod risk_factors;
mod sepsis;
mod symptoms;
mod treatment;
pub mod vital_signs;

use cdm_model::{FormKind, SourceRecord};

use crate::error::Result;
use crate::scope::SubjectScope;

/// A rule loads one record of its form.
pub type FormRule = fn(&mut SubjectScope<'_>, &SourceRecord) -> Result<()>;

/// The rule that loads `form`.
pub fn rule_for(form: FormKind) -> FormRule {
    match form {
        FormKind::Patient => patient::load_patient,
        FormKind::Symptoms => symptoms::load_symptoms,
        FormKind::VitalSigns => vital_signs::load_vital_signs,
        FormKind::Comorbidity => comorbidity::load_comorbidity,
        FormKind::Sepsis => sepsis::load_sepsis,
        FormKind::RiskFactors => risk_factors::load_risk_factors,
        FormKind::PriorInfection => prior_culture::load_prior_infection,
        FormKind::PriorColonization => prior_culture::load_prior_colonization,
        FormKind::PriorTreatment => treatment::load_prior_treatment,
        FormKind::EmpiricalTreatment => treatment::load_empirical_treatment,
        FormKind::BloodCulture => culture::load_blood_culture,
        FormKind::OtherCulture => culture::load_other_culture,
    }
}
