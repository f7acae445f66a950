//! Registry-specific load settings.
//!
//! Deserialized from the `[registry]`, `[defaults]` and `[resistance]`
//! tables of the configuration file. Every field has a default, so an empty
//! file yields the values the MEPRAM registry uses.

use cdm_model::ConceptId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadSettings {
    pub registry: RegistrySettings,
    pub defaults: DefaultValues,
    pub resistance: ResistanceSettings,
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Namespace for subject identities in `person_origin`.
    pub name: String,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            name: "MEPRAM-Sepsis".to_string(),
        }
    }
}

// ============================================================================
// Fallback values
// ============================================================================

/// Values substituted when a source cell is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultValues {
    /// Infection focus code used when `foco` is empty.
    pub focus: String,
    /// Infectious syndrome code used when `sindrome_infeccioso` is empty.
    pub syndrome: String,
    /// Organism concept recorded when the organism cell is empty.
    pub organism: ConceptId,
    /// SNOMED code of the generic antimicrobial used when the ATC code does not translate.
    pub antimicrobial: String,
    /// Days before admission assumed for an undated previous infection or colonization.
    pub prior_infection_lookback_days: i64,
    /// Days before admission assumed for an undated previous treatment.
    pub prior_treatment_lookback_days: i64,
    /// Treatment length assumed when `dias_trat_antimicrobiano` is empty.
    pub prior_treatment_days: i64,
}

impl Default for DefaultValues {
    fn default() -> Self {
        Self {
            focus: "12".to_string(),
            syndrome: "13".to_string(),
            organism: ConceptId::new(4259632),
            antimicrobial: "895275007".to_string(),
            prior_infection_lookback_days: 365,
            prior_treatment_lookback_days: 90,
            prior_treatment_days: 30,
        }
    }
}

// ============================================================================
// Resistance phenotypes
// ============================================================================

/// Lineage rule for the phenotype checkbox group: when `option` is ticked
/// and the organism descends from `ancestor`, record `phenotype` instead of
/// the table's concept for that option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResistanceSettings {
    pub ancestor: ConceptId,
    pub option: String,
    pub phenotype: ConceptId,
}

impl Default for ResistanceSettings {
    fn default() -> Self {
        Self {
            ancestor: ConceptId::new(4214811),
            option: "1".to_string(),
            phenotype: ConceptId::new(3009403),
        }
    }
}
