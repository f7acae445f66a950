//! Concept Resolver: one place to ask every concept question the rules need.

use std::path::Path;

use cdm_model::{ConceptId, RelationshipConcept};

use crate::concept_table::{Branch, ConceptTable};
use crate::drug::DrugCodeTranslator;
use crate::error::{MissingMapping, StandardsError};
use crate::vocabulary::Vocabulary;

/// Everything loaded from the standards files.
#[derive(Debug, Clone, Default)]
pub struct ConceptResolver {
    table: ConceptTable,
    vocabulary: Vocabulary,
    drugs: DrugCodeTranslator,
}

impl ConceptResolver {
    pub fn new(table: ConceptTable, vocabulary: Vocabulary, drugs: DrugCodeTranslator) -> Self {
        Self {
            table,
            vocabulary,
            drugs,
        }
    }

    /// Load the concept table, the drug cross-reference and the vocabulary directory.
    pub fn load(
        concept_table: &Path,
        drug_codes: &Path,
        vocabulary_dir: &Path,
    ) -> Result<Self, StandardsError> {
        Ok(Self::new(
            ConceptTable::load(concept_table)?,
            Vocabulary::load_dir(vocabulary_dir)?,
            DrugCodeTranslator::load(drug_codes)?,
        ))
    }

    pub fn table(&self) -> &ConceptTable {
        &self.table
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn drugs(&self) -> &DrugCodeTranslator {
        &self.drugs
    }

    /// Concept id for `(variable, branch, value)`. A row whose id cell is
    /// empty counts as missing.
    pub fn resolve(
        &self,
        variable: &str,
        branch: Branch,
        value: &str,
    ) -> Result<ConceptId, MissingMapping> {
        self.table
            .get(variable, branch, value)
            .and_then(|entry| entry.concept_id)
            .ok_or_else(|| MissingMapping::Concept {
                variable: variable.to_string(),
                branch,
                value: value.to_string(),
            })
    }

    /// Concept code for `(variable, branch, value)`.
    pub fn resolve_code(
        &self,
        variable: &str,
        branch: Branch,
        value: &str,
    ) -> Result<&str, MissingMapping> {
        self.table
            .get(variable, branch, value)
            .and_then(|entry| entry.concept_code.as_deref())
            .ok_or_else(|| MissingMapping::Code {
                variable: variable.to_string(),
                branch,
                value: value.to_string(),
            })
    }

    pub fn standard_concept(&self, vocabulary: &str, code: &str) -> Result<ConceptId, MissingMapping> {
        self.vocabulary.standard_concept(vocabulary, code)
    }

    pub fn concept_by_name(&self, vocabulary: &str, name: &str) -> Result<ConceptId, MissingMapping> {
        self.vocabulary.concept_by_name(vocabulary, name)
    }

    pub fn relationship_concept(&self, name: &str) -> Result<ConceptId, MissingMapping> {
        self.vocabulary.relationship_concept(name)
    }

    /// Resolve a relationship concept wherever it lives.
    pub fn relationship(&self, concept: RelationshipConcept) -> Result<ConceptId, MissingMapping> {
        match concept {
            RelationshipConcept::Named { vocabulary, name } => {
                self.concept_by_name(vocabulary, name)
            }
            RelationshipConcept::Relationship { name } => self.relationship_concept(name),
        }
    }

    pub fn translate_drug(&self, atc_code: &str) -> Result<ConceptId, MissingMapping> {
        self.drugs.translate(atc_code)
    }

    pub fn has_ancestor(&self, descendant: ConceptId, ancestor: ConceptId) -> bool {
        self.vocabulary.has_ancestor(descendant, ancestor)
    }
}
