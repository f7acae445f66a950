//! ATC to RxNorm cross-reference.

use std::collections::HashMap;
use std::path::Path;

use cdm_model::ConceptId;

use crate::csv_utils::{get_field, read_delimited_rows};
use crate::error::{MissingMapping, StandardsError};

const ATC_COLUMN: &str = "atc_code";
const CONCEPT_COLUMN: &str = "conceptId";

#[derive(Debug, Clone, Default)]
pub struct DrugCodeTranslator {
    by_atc: HashMap<String, ConceptId>,
}

impl DrugCodeTranslator {
    /// Load the `;`-separated `atc_code;conceptId` table.
    pub fn load(path: &Path) -> Result<Self, StandardsError> {
        let rows = read_delimited_rows(path, b';', &[ATC_COLUMN, CONCEPT_COLUMN])?;
        let mut translator = DrugCodeTranslator::default();
        for (idx, row) in rows.iter().enumerate() {
            let code = get_field(row, ATC_COLUMN);
            if code.is_empty() {
                continue;
            }
            let concept = ConceptId::parse(&get_field(row, CONCEPT_COLUMN)).map_err(|e| {
                StandardsError::InvalidRow {
                    path: path.to_path_buf(),
                    row: idx + 2,
                    message: e.to_string(),
                }
            })?;
            translator.insert(&code, concept);
        }
        Ok(translator)
    }

    /// Add a code; the first concept seen for a code is kept.
    pub fn insert(&mut self, atc_code: &str, concept: ConceptId) {
        self.by_atc
            .entry(atc_code.trim().to_ascii_uppercase())
            .or_insert(concept);
    }

    pub fn translate(&self, atc_code: &str) -> Result<ConceptId, MissingMapping> {
        self.by_atc
            .get(&atc_code.trim().to_ascii_uppercase())
            .copied()
            .ok_or_else(|| MissingMapping::Drug {
                code: atc_code.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.by_atc.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_atc.is_empty()
    }
}
