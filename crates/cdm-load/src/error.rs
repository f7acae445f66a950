#![deny(unsafe_code)]

use cdm_standards::MissingMapping;
use cdm_store::StoreError;

/// Why one (subject, form) group could not be loaded.
///
/// Every variant fails only the group it occurs in; the pipeline rolls the
/// group back and moves on.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    MissingMapping(#[from] MissingMapping),

    #[error("missing precondition: no {what} for this subject")]
    MissingPrecondition { what: &'static str },

    #[error("required field {field} is empty")]
    MissingField { field: &'static str },

    /// The offending value is kept for callers that may log it, but it is
    /// not part of the message.
    #[error("invalid value in {field}")]
    InvalidValue { field: String, value: String },

    #[error("{what} already exists for this subject")]
    DuplicateFact { what: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LoadError {
    pub(crate) fn invalid(field: &str, value: &str) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Short category used in summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::MissingMapping(_) => "missing mapping",
            LoadError::MissingPrecondition { .. } => "missing precondition",
            LoadError::MissingField { .. } => "missing field",
            LoadError::InvalidValue { .. } => "invalid value",
            LoadError::DuplicateFact { .. } => "duplicate fact",
            LoadError::Store(_) => "store",
        }
    }
}

impl LoadError {
    /// Message without source values, safe to log and print.
    pub fn redacted_message(&self) -> String {
        match self {
            LoadError::MissingMapping(miss) => format!("no mapping for {}", miss.lookup()),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
