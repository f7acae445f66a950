//! Well-known CDM concept ids written by the loader.
//!
//! Registry-specific defaults (fallback organism, default antimicrobial,
//! resistance lineage) are configuration, not constants, and live with the
//! load settings.

use crate::ids::ConceptId;

/// Type concept stamped on every fact: the record came from a case report form.
pub const CASE_REPORT_FORM: ConceptId = ConceptId::new(32809);

/// Emergency room visit.
pub const EMERGENCY_ROOM_VISIT: ConceptId = ConceptId::new(9203);

/// Condition status of the infection focus.
pub const ADMISSION_DIAGNOSIS: ConceptId = ConceptId::new(32890);

/// Episode concept for the sepsis episode.
pub const DISEASE_EPISODE: ConceptId = ConceptId::new(32533);

/// Episode object: disorder due to infection.
pub const INFECTIOUS_DISEASE: ConceptId = ConceptId::new(432250);
