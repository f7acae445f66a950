#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// Subject identifier as it appears in the capture system (`record_id`).
///
/// Record ids carry the hospital code as a prefix, e.g. `HUVR-0042`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidSubjectId(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hospital code: everything before the first `-`.
    pub fn site_code(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

integer_id!(
    /// Synthetic subject identifier allocated by the identity registry.
    PersonId
);
integer_id!(
    /// Generated identifier of a fact row (condition, measurement, ...).
    FactId
);
integer_id!(VisitId);
integer_id!(EpisodeId);
integer_id!(CareSiteId);
integer_id!(
    /// Standardized vocabulary concept.
    ConceptId
);

impl ConceptId {
    /// Parse a concept id cell. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Result<Self, ModelError> {
        raw.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| ModelError::InvalidConceptId(raw.to_string()))
    }
}
