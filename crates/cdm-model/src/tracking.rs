#![deny(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Quality flag on a processing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityFlag {
    #[default]
    Valid,
    Invalid,
}

impl QualityFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            QualityFlag::Valid => "valid",
            QualityFlag::Invalid => "invalid",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "valid" => Some(QualityFlag::Valid),
            "invalid" => Some(QualityFlag::Invalid),
            _ => None,
        }
    }
}

impl fmt::Display for QualityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields that failed external validation, keyed by subject.
///
/// Entries are `"form:field"` strings, as produced by the validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct InvalidFieldReport(BTreeMap<String, Vec<String>>);

impl InvalidFieldReport {
    pub fn new(entries: BTreeMap<String, Vec<String>>) -> Self {
        Self(entries)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn subject_count(&self) -> usize {
        self.0.len()
    }

    /// Distinct form names flagged per subject.
    pub fn forms_by_subject(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        self.0
            .iter()
            .map(|(subject, fields)| {
                let forms = fields
                    .iter()
                    .map(|entry| entry.split(':').next().unwrap_or(entry).trim())
                    .filter(|form| !form.is_empty())
                    .collect();
                (subject.as_str(), forms)
            })
            .collect()
    }
}
