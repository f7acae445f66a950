//! OMOP vocabulary lookups.
//!
//! Loaded from an Athena vocabulary download: tab-separated `CONCEPT.csv`,
//! `CONCEPT_RELATIONSHIP.csv`, `CONCEPT_ANCESTOR.csv` and `RELATIONSHIP.csv`.
//! Only the columns the loader needs are kept in memory.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use cdm_model::ConceptId;
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;

use crate::csv_utils::{normalized_headers, open_error, require_columns};
use crate::error::{MissingMapping, StandardsError};
use crate::hierarchy::ConceptHierarchy;

pub const CONCEPT_FILE: &str = "CONCEPT.csv";
pub const CONCEPT_RELATIONSHIP_FILE: &str = "CONCEPT_RELATIONSHIP.csv";
pub const CONCEPT_ANCESTOR_FILE: &str = "CONCEPT_ANCESTOR.csv";
pub const RELATIONSHIP_FILE: &str = "RELATIONSHIP.csv";

const MAPS_TO: &str = "Maps to";

#[derive(Debug, serde::Deserialize)]
struct ConceptRow {
    concept_id: i64,
    concept_name: String,
    vocabulary_id: String,
    #[serde(default)]
    standard_concept: String,
    concept_code: String,
}

#[derive(Debug, serde::Deserialize)]
struct ConceptRelationshipRow {
    concept_id_1: i64,
    concept_id_2: i64,
    relationship_id: String,
    #[serde(default)]
    invalid_reason: String,
}

#[derive(Debug, serde::Deserialize)]
struct ConceptAncestorRow {
    ancestor_concept_id: i64,
    descendant_concept_id: i64,
    min_levels_of_separation: i64,
}

#[derive(Debug, serde::Deserialize)]
struct RelationshipRow {
    relationship_name: String,
    relationship_concept_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    by_code: HashMap<(String, String), ConceptId>,
    by_name: HashMap<(String, String), ConceptId>,
    standard: HashSet<ConceptId>,
    maps_to: HashMap<ConceptId, ConceptId>,
    relationships: HashMap<String, ConceptId>,
    hierarchy: ConceptHierarchy,
}

impl Vocabulary {
    /// Load the four vocabulary tables from an Athena download directory.
    pub fn load_dir(dir: &Path) -> Result<Self, StandardsError> {
        let mut vocabulary = Vocabulary::default();

        for row in read_tab_rows::<ConceptRow>(
            &dir.join(CONCEPT_FILE),
            &["concept_id", "concept_name", "vocabulary_id", "concept_code"],
        )? {
            vocabulary.add_concept(
                ConceptId::new(row.concept_id),
                &row.vocabulary_id,
                &row.concept_code,
                &row.concept_name,
                row.standard_concept == "S",
            );
        }

        for row in read_tab_rows::<ConceptRelationshipRow>(
            &dir.join(CONCEPT_RELATIONSHIP_FILE),
            &["concept_id_1", "concept_id_2", "relationship_id"],
        )? {
            if row.relationship_id == MAPS_TO && row.invalid_reason.is_empty() {
                vocabulary.add_maps_to(
                    ConceptId::new(row.concept_id_1),
                    ConceptId::new(row.concept_id_2),
                );
            }
        }

        for row in read_tab_rows::<ConceptAncestorRow>(
            &dir.join(CONCEPT_ANCESTOR_FILE),
            &[
                "ancestor_concept_id",
                "descendant_concept_id",
                "min_levels_of_separation",
            ],
        )? {
            if row.min_levels_of_separation == 1 {
                vocabulary.add_parent(
                    ConceptId::new(row.descendant_concept_id),
                    ConceptId::new(row.ancestor_concept_id),
                );
            }
        }

        for row in read_tab_rows::<RelationshipRow>(
            &dir.join(RELATIONSHIP_FILE),
            &["relationship_name", "relationship_concept_id"],
        )? {
            vocabulary.add_relationship(
                &row.relationship_name,
                ConceptId::new(row.relationship_concept_id),
            );
        }

        Ok(vocabulary)
    }

    pub fn add_concept(
        &mut self,
        id: ConceptId,
        vocabulary: &str,
        code: &str,
        name: &str,
        standard: bool,
    ) {
        self.by_code
            .entry((vocabulary.to_string(), code.to_string()))
            .or_insert(id);
        self.by_name
            .entry((vocabulary.to_string(), name.to_string()))
            .or_insert(id);
        if standard {
            self.standard.insert(id);
        }
    }

    /// Record a `Maps to` link. The first target seen for a source is kept.
    pub fn add_maps_to(&mut self, source: ConceptId, target: ConceptId) {
        self.maps_to.entry(source).or_insert(target);
    }

    pub fn add_relationship(&mut self, name: &str, concept: ConceptId) {
        self.relationships
            .entry(name.to_string())
            .or_insert(concept);
    }

    pub fn add_parent(&mut self, child: ConceptId, parent: ConceptId) {
        self.hierarchy.add_parent(child, parent);
    }

    pub fn concept_count(&self) -> usize {
        self.by_code.len()
    }

    /// Standard concept for a source code, following `Maps to`.
    ///
    /// A standard concept without an explicit mapping maps to itself.
    pub fn standard_concept(&self, vocabulary: &str, code: &str) -> Result<ConceptId, MissingMapping> {
        let missing = || MissingMapping::Standard {
            vocabulary: vocabulary.to_string(),
            code: code.to_string(),
        };
        let source = self
            .by_code
            .get(&(vocabulary.to_string(), code.trim().to_string()))
            .copied()
            .ok_or_else(missing)?;
        if let Some(target) = self.maps_to.get(&source) {
            return Ok(*target);
        }
        if self.standard.contains(&source) {
            return Ok(source);
        }
        Err(missing())
    }

    pub fn concept_by_name(&self, vocabulary: &str, name: &str) -> Result<ConceptId, MissingMapping> {
        self.by_name
            .get(&(vocabulary.to_string(), name.to_string()))
            .copied()
            .ok_or_else(|| MissingMapping::Named {
                vocabulary: vocabulary.to_string(),
                name: name.to_string(),
            })
    }

    pub fn relationship_concept(&self, name: &str) -> Result<ConceptId, MissingMapping> {
        self.relationships
            .get(name)
            .copied()
            .ok_or_else(|| MissingMapping::Relationship {
                name: name.to_string(),
            })
    }

    pub fn has_ancestor(&self, descendant: ConceptId, ancestor: ConceptId) -> bool {
        self.hierarchy.has_ancestor(descendant, ancestor)
    }
}

/// Athena files are tab-separated and do not quote fields.
fn read_tab_rows<T: DeserializeOwned>(
    path: &Path,
    required: &[&str],
) -> Result<Vec<T>, StandardsError> {
    if !path.is_file() {
        return Err(StandardsError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| open_error(path, e))?;
    let headers = reader
        .headers()
        .map_err(|e| StandardsError::csv(path, &e))?
        .clone();
    let normalized = normalized_headers(&headers);
    require_columns(path, &normalized, required)?;
    reader.set_headers(csv::StringRecord::from(normalized));

    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize::<T>().enumerate() {
        let row = record.map_err(|e| StandardsError::InvalidRow {
            path: path.to_path_buf(),
            row: idx + 2,
            message: e.to_string(),
        })?;
        rows.push(row);
    }
    Ok(rows)
}
