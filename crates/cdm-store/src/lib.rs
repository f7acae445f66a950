#![deny(unsafe_code)]

pub mod error;
pub mod facts;
pub mod identity;
pub mod queries;
pub mod registries;
pub mod schema;
pub mod tracker;

pub use error::{Result, StoreError};
pub use identity::{lookup_person, resolve_or_allocate};
pub use queries::EpisodeCandidate;
pub use schema::{TABLES, ensure_schema, open_memory_store, open_store};
pub use tracker::{QualityUpdate, apply_invalid_report, is_processed, mark_processed, mark_quality};

pub use rusqlite::{Connection, Transaction};
