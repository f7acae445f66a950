#![deny(unsafe_code)]

use std::path::PathBuf;

use crate::concept_table::Branch;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("missing column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("invalid row {row} in {path}: {message}")]
    InvalidRow {
        path: PathBuf,
        row: usize,
        message: String,
    },

    #[error("missing vocabulary file: {path}")]
    MissingFile { path: PathBuf },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, error: &csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

/// A lookup that found no row. Recoverable: callers decide whether to fall
/// back to a default or fail the record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MissingMapping {
    #[error("no {branch} mapping for {variable} = {value}")]
    Concept {
        variable: String,
        branch: Branch,
        value: String,
    },

    #[error("no {branch} code for {variable} = {value}")]
    Code {
        variable: String,
        branch: Branch,
        value: String,
    },

    #[error("no standard concept for {vocabulary} code {code}")]
    Standard { vocabulary: String, code: String },

    #[error("no concept named '{name}' in {vocabulary}")]
    Named { vocabulary: String, name: String },

    #[error("no relationship named '{name}'")]
    Relationship { name: String },

    #[error("no RxNorm concept for ATC code {code}")]
    Drug { code: String },
}

impl MissingMapping {
    /// The lookup that missed, without the looked-up value.
    pub fn lookup(&self) -> String {
        match self {
            MissingMapping::Concept {
                variable, branch, ..
            }
            | MissingMapping::Code {
                variable, branch, ..
            } => format!("{branch} of {variable}"),
            MissingMapping::Standard { vocabulary, .. } => format!("{vocabulary} standard concept"),
            MissingMapping::Named { vocabulary, name } => format!("'{name}' in {vocabulary}"),
            MissingMapping::Relationship { name } => format!("relationship '{name}'"),
            MissingMapping::Drug { .. } => "ATC to RxNorm translation".to_string(),
        }
    }
}
