pub mod concepts;
pub mod domain;
pub mod error;
pub mod facts;
pub mod form;
pub mod ids;
pub mod record;
pub mod relationship;
pub mod tracking;

pub use domain::{EventField, FactDomain};
pub use error::{ModelError, Result};
pub use facts::{
    CareSite, EventLink, FactRelationship, NewCondition, NewDrugExposure, NewEpisode,
    NewEpisodeEvent, NewMeasurement, NewObservation, NewObservationPeriod, NewPerson,
    NewProcedure, NewSpecimen, NewVisit,
};
pub use form::{CHECKBOX_SEPARATOR, FormKind, SUBJECT_FIELD};
pub use ids::{CareSiteId, ConceptId, EpisodeId, FactId, PersonId, SubjectId, VisitId};
pub use record::SourceRecord;
pub use relationship::{RelationshipConcept, RelationshipKind};
pub use tracking::{InvalidFieldReport, QualityFlag};
