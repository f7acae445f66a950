#![deny(unsafe_code)]

use std::fmt;

use crate::domain::FactDomain;

/// Where a relationship concept is looked up in the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipConcept {
    /// A concept row matched by name within a vocabulary.
    Named {
        vocabulary: &'static str,
        name: &'static str,
    },
    /// A `relationship` row matched by `relationship_name`.
    Relationship { name: &'static str },
}

/// Kinds of symmetric fact links the loader creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    /// Infection focus condition and its empirical treatment.
    InfectiousDiseaseEpisode,
    /// Past infection condition and its causative organism.
    PreviousInfection,
    /// Past colonization observation and the colonizing organism.
    PreviousColonization,
}

impl RelationshipKind {
    pub const ALL: [RelationshipKind; 3] = [
        RelationshipKind::InfectiousDiseaseEpisode,
        RelationshipKind::PreviousInfection,
        RelationshipKind::PreviousColonization,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RelationshipKind::InfectiousDiseaseEpisode => "infectious_disease_episode",
            RelationshipKind::PreviousInfection => "previous_infection",
            RelationshipKind::PreviousColonization => "previous_colonization",
        }
    }

    /// Domains of the first and second fact of the forward row.
    pub fn domains(self) -> (FactDomain, FactDomain) {
        match self {
            RelationshipKind::InfectiousDiseaseEpisode => {
                (FactDomain::Condition, FactDomain::Drug)
            }
            RelationshipKind::PreviousInfection => {
                (FactDomain::Condition, FactDomain::Observation)
            }
            RelationshipKind::PreviousColonization => {
                (FactDomain::Observation, FactDomain::Observation)
            }
        }
    }

    pub fn forward(self) -> RelationshipConcept {
        match self {
            RelationshipKind::InfectiousDiseaseEpisode => RelationshipConcept::Named {
                vocabulary: "SNOMED",
                name: "Treated with",
            },
            RelationshipKind::PreviousInfection | RelationshipKind::PreviousColonization => {
                RelationshipConcept::Relationship {
                    name: "Has causative agent (SNOMED)",
                }
            }
        }
    }

    pub fn inverse(self) -> RelationshipConcept {
        match self {
            RelationshipKind::InfectiousDiseaseEpisode => RelationshipConcept::Named {
                vocabulary: "SNOMED",
                name: "Treats",
            },
            RelationshipKind::PreviousInfection | RelationshipKind::PreviousColonization => {
                RelationshipConcept::Relationship {
                    name: "Causative agent of (SNOMED)",
                }
            }
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
