#![deny(unsafe_code)]

use std::fmt;

use crate::ids::ConceptId;

/// Target fact kinds written by the per-form rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FactDomain {
    Condition,
    Drug,
    Measurement,
    Observation,
    Procedure,
    Specimen,
}

impl FactDomain {
    pub const ALL: [FactDomain; 6] = [
        FactDomain::Condition,
        FactDomain::Drug,
        FactDomain::Measurement,
        FactDomain::Observation,
        FactDomain::Procedure,
        FactDomain::Specimen,
    ];

    /// Target table holding facts of this domain.
    pub fn table(self) -> &'static str {
        match self {
            FactDomain::Condition => "condition_occurrence",
            FactDomain::Drug => "drug_exposure",
            FactDomain::Measurement => "measurement",
            FactDomain::Observation => "observation",
            FactDomain::Procedure => "procedure_occurrence",
            FactDomain::Specimen => "specimen",
        }
    }

    /// Concept name in the `Domain` vocabulary.
    pub fn name(self) -> &'static str {
        match self {
            FactDomain::Condition => "Condition",
            FactDomain::Drug => "Drug",
            FactDomain::Measurement => "Measurement",
            FactDomain::Observation => "Observation",
            FactDomain::Procedure => "Procedure",
            FactDomain::Specimen => "Specimen",
        }
    }

    /// Domain concept id used in `fact_relationship.domain_concept_id_*`.
    pub fn concept(self) -> ConceptId {
        let id = match self {
            FactDomain::Condition => 19,
            FactDomain::Drug => 13,
            FactDomain::Measurement => 21,
            FactDomain::Observation => 27,
            FactDomain::Procedure => 10,
            FactDomain::Specimen => 36,
        };
        ConceptId::new(id)
    }
}

impl fmt::Display for FactDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Field concept identifying which table an event id points into.
///
/// Used by `episode_event.episode_event_field_concept_id` and by the
/// `*_event_field_concept_id` columns that chain measurements and
/// observations to an earlier fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventField {
    Condition,
    Drug,
    Specimen,
    Measurement,
    Observation,
}

impl EventField {
    pub fn concept(self) -> ConceptId {
        let id = match self {
            EventField::Condition => 1147129,
            EventField::Drug => 1147096,
            EventField::Specimen => 1147051,
            EventField::Measurement => 1147140,
            EventField::Observation => 1147167,
        };
        ConceptId::new(id)
    }
}
