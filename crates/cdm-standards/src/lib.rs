#![deny(unsafe_code)]

pub mod concept_table;
pub mod csv_utils;
pub mod drug;
pub mod error;
pub mod hash;
pub mod hierarchy;
pub mod resolver;
pub mod vocabulary;

pub use crate::concept_table::{Branch, ConceptEntry, ConceptTable, MappingKey, NONE_VALUE};
pub use crate::drug::DrugCodeTranslator;
pub use crate::error::{MissingMapping, StandardsError};
pub use crate::hash::{file_sha256, sha256_hex};
pub use crate::hierarchy::{ConceptHierarchy, MAX_ANCESTOR_DEPTH};
pub use crate::resolver::ConceptResolver;
pub use crate::vocabulary::Vocabulary;
