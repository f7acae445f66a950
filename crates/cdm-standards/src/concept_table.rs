//! Registry concept mapping table.
//!
//! The table maps `(variable, branch, source value)` to a target concept. It
//! is a `;`-separated file with the columns `variable`, `branch`,
//! `source_value`, `concept_id` and `concept_code`. Empty cells read as
//! [`NONE_VALUE`], so a variable whose concept does not depend on its value
//! is keyed by `NONE`.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use cdm_model::ConceptId;

use crate::csv_utils::{get_field, read_delimited_rows};
use crate::error::StandardsError;

/// Placeholder value for mappings that do not depend on the source value.
pub const NONE_VALUE: &str = "NONE";

const COLUMNS: [&str; 5] = [
    "variable",
    "branch",
    "source_value",
    "concept_id",
    "concept_code",
];

/// Semantic branch of a mapping row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Branch {
    /// The domain concept a variable (or value) stands for.
    Semantic,
    /// A qualifier or answer concept.
    Value,
    Units,
    Operator,
}

impl Branch {
    pub fn as_str(self) -> &'static str {
        match self {
            Branch::Semantic => "semantic_link",
            Branch::Value => "value_link",
            Branch::Units => "units_link",
            Branch::Operator => "operator_link",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "semantic_link" => Some(Branch::Semantic),
            "value_link" => Some(Branch::Value),
            "units_link" => Some(Branch::Units),
            "operator_link" => Some(Branch::Operator),
            _ => None,
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MappingKey {
    pub variable: String,
    pub branch: Branch,
    pub value: String,
}

impl MappingKey {
    /// Build a key; an empty value becomes [`NONE_VALUE`].
    pub fn new(variable: &str, branch: Branch, value: &str) -> Self {
        let value = value.trim();
        Self {
            variable: variable.trim().to_string(),
            branch,
            value: if value.is_empty() {
                NONE_VALUE.to_string()
            } else {
                value.to_string()
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConceptEntry {
    pub concept_id: Option<ConceptId>,
    pub concept_code: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConceptTable {
    entries: HashMap<MappingKey, ConceptEntry>,
    skipped_rows: usize,
}

impl ConceptTable {
    /// Load the mapping table from disk.
    ///
    /// Rows with an unknown branch are skipped and counted. When a key occurs
    /// more than once, the first row wins.
    pub fn load(path: &Path) -> Result<Self, StandardsError> {
        let rows = read_delimited_rows(path, b';', &COLUMNS)?;
        let mut table = ConceptTable::default();
        for (idx, row) in rows.iter().enumerate() {
            let Some(branch) = Branch::parse(&get_field(row, "branch")) else {
                table.skipped_rows += 1;
                continue;
            };
            let key = MappingKey::new(
                &get_field(row, "variable"),
                branch,
                &get_field(row, "source_value"),
            );
            let concept_id = parse_concept_cell(&get_field(row, "concept_id")).map_err(
                |message| StandardsError::InvalidRow {
                    path: path.to_path_buf(),
                    row: idx + 2,
                    message,
                },
            )?;
            let code = get_field(row, "concept_code");
            let concept_code = (!code.is_empty() && code != NONE_VALUE).then_some(code);
            table.entries.entry(key).or_insert(ConceptEntry {
                concept_id,
                concept_code,
            });
        }
        Ok(table)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (MappingKey, ConceptEntry)>) -> Self {
        let mut table = ConceptTable::default();
        for (key, entry) in entries {
            table.entries.entry(key).or_insert(entry);
        }
        table
    }

    pub fn get(&self, variable: &str, branch: Branch, value: &str) -> Option<&ConceptEntry> {
        self.entries.get(&MappingKey::new(variable, branch, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows ignored at load time because their branch is not recognized.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

/// Parse a concept id cell. `NONE` and blanks mean "no concept".
///
/// Spreadsheet exports sometimes write integers as `4259632.0`; those are
/// accepted as long as there is no fractional part.
fn parse_concept_cell(raw: &str) -> Result<Option<ConceptId>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NONE_VALUE {
        return Ok(None);
    }
    if let Ok(id) = ConceptId::parse(trimmed) {
        return Ok(Some(id));
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.is_finite() => {
            Ok(Some(ConceptId::new(value as i64)))
        }
        _ => Err(format!("concept_id '{trimmed}' is not an integer")),
    }
}
