//! Rows written to the CDM tables.
//!
//! Each struct carries exactly the columns the loader fills. Builders set the
//! optional columns; the type concept defaults to [`CASE_REPORT_FORM`].

use chrono::NaiveDate;

use crate::concepts::CASE_REPORT_FORM;
use crate::domain::{EventField, FactDomain};
use crate::ids::{CareSiteId, ConceptId, EpisodeId, FactId, PersonId, VisitId};

/// Pointer from a fact to an earlier fact (`*_event_id` + `*_event_field_concept_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventLink {
    pub id: FactId,
    pub field: EventField,
}

impl EventLink {
    pub fn new(id: FactId, field: EventField) -> Self {
        Self { id, field }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPerson {
    pub person_id: PersonId,
    pub gender_concept_id: ConceptId,
    pub year_of_birth: i32,
    pub birth_date: NaiveDate,
    pub care_site_id: Option<CareSiteId>,
    pub person_source_value: String,
    pub gender_source_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVisit {
    pub person_id: PersonId,
    pub visit_concept_id: ConceptId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub type_concept_id: ConceptId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewObservationPeriod {
    pub person_id: PersonId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub type_concept_id: ConceptId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCondition {
    pub person_id: PersonId,
    pub concept_id: ConceptId,
    pub start_date: NaiveDate,
    pub type_concept_id: ConceptId,
    pub status_concept_id: Option<ConceptId>,
    pub visit_id: Option<VisitId>,
    pub source_value: Option<String>,
}

impl NewCondition {
    pub fn new(person_id: PersonId, concept_id: ConceptId, start_date: NaiveDate) -> Self {
        Self {
            person_id,
            concept_id,
            start_date,
            type_concept_id: CASE_REPORT_FORM,
            status_concept_id: None,
            visit_id: None,
            source_value: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: ConceptId) -> Self {
        self.status_concept_id = Some(status);
        self
    }

    #[must_use]
    pub fn with_visit(mut self, visit: Option<VisitId>) -> Self {
        self.visit_id = visit;
        self
    }

    #[must_use]
    pub fn with_source_value(mut self, value: Option<&str>) -> Self {
        self.source_value = value.map(str::to_string);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMeasurement {
    pub person_id: PersonId,
    pub concept_id: ConceptId,
    pub date: NaiveDate,
    pub type_concept_id: ConceptId,
    pub operator_concept_id: Option<ConceptId>,
    pub value_as_number: Option<f64>,
    pub value_as_concept_id: Option<ConceptId>,
    pub unit_concept_id: Option<ConceptId>,
    pub event: Option<EventLink>,
    pub visit_id: Option<VisitId>,
    pub source_value: Option<String>,
    pub value_source_value: Option<String>,
}

impl NewMeasurement {
    pub fn new(person_id: PersonId, concept_id: ConceptId, date: NaiveDate) -> Self {
        Self {
            person_id,
            concept_id,
            date,
            type_concept_id: CASE_REPORT_FORM,
            operator_concept_id: None,
            value_as_number: None,
            value_as_concept_id: None,
            unit_concept_id: None,
            event: None,
            visit_id: None,
            source_value: None,
            value_source_value: None,
        }
    }

    #[must_use]
    pub fn with_number(mut self, value: f64) -> Self {
        self.value_as_number = Some(value);
        self
    }

    #[must_use]
    pub fn with_value_concept(mut self, concept: ConceptId) -> Self {
        self.value_as_concept_id = Some(concept);
        self
    }

    #[must_use]
    pub fn with_operator(mut self, concept: ConceptId) -> Self {
        self.operator_concept_id = Some(concept);
        self
    }

    #[must_use]
    pub fn with_unit(mut self, concept: ConceptId) -> Self {
        self.unit_concept_id = Some(concept);
        self
    }

    #[must_use]
    pub fn with_event(mut self, event: EventLink) -> Self {
        self.event = Some(event);
        self
    }

    #[must_use]
    pub fn with_visit(mut self, visit: Option<VisitId>) -> Self {
        self.visit_id = visit;
        self
    }

    /// Set the variable name and raw value that produced this row.
    #[must_use]
    pub fn with_source(mut self, variable: &str, value: Option<&str>) -> Self {
        self.source_value = Some(variable.to_string());
        self.value_source_value = value.map(str::to_string);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewObservation {
    pub person_id: PersonId,
    pub concept_id: ConceptId,
    pub date: NaiveDate,
    pub type_concept_id: ConceptId,
    pub value_as_number: Option<f64>,
    pub value_as_concept_id: Option<ConceptId>,
    pub qualifier_concept_id: Option<ConceptId>,
    pub value_source_value: Option<String>,
    pub event: Option<EventLink>,
    pub visit_id: Option<VisitId>,
    pub source_value: Option<String>,
}

impl NewObservation {
    pub fn new(person_id: PersonId, concept_id: ConceptId, date: NaiveDate) -> Self {
        Self {
            person_id,
            concept_id,
            date,
            type_concept_id: CASE_REPORT_FORM,
            value_as_number: None,
            value_as_concept_id: None,
            qualifier_concept_id: None,
            value_source_value: None,
            event: None,
            visit_id: None,
            source_value: None,
        }
    }

    #[must_use]
    pub fn with_number(mut self, value: f64) -> Self {
        self.value_as_number = Some(value);
        self
    }

    #[must_use]
    pub fn with_value_concept(mut self, concept: Option<ConceptId>) -> Self {
        self.value_as_concept_id = concept;
        self
    }

    #[must_use]
    pub fn with_qualifier(mut self, concept: Option<ConceptId>) -> Self {
        self.qualifier_concept_id = concept;
        self
    }

    #[must_use]
    pub fn with_value_source(mut self, value: Option<&str>) -> Self {
        self.value_source_value = value.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_event(mut self, event: EventLink) -> Self {
        self.event = Some(event);
        self
    }

    #[must_use]
    pub fn with_visit(mut self, visit: Option<VisitId>) -> Self {
        self.visit_id = visit;
        self
    }

    #[must_use]
    pub fn with_source_value(mut self, variable: &str) -> Self {
        self.source_value = Some(variable.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProcedure {
    pub person_id: PersonId,
    pub concept_id: ConceptId,
    pub date: NaiveDate,
    pub type_concept_id: ConceptId,
    pub visit_id: Option<VisitId>,
    pub source_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDrugExposure {
    pub person_id: PersonId,
    pub concept_id: ConceptId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub type_concept_id: ConceptId,
    pub visit_id: Option<VisitId>,
    pub source_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSpecimen {
    pub person_id: PersonId,
    pub concept_id: ConceptId,
    pub date: NaiveDate,
    pub type_concept_id: ConceptId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEpisode {
    pub person_id: PersonId,
    pub concept_id: ConceptId,
    pub start_date: NaiveDate,
    pub type_concept_id: ConceptId,
    pub object_concept_id: ConceptId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewEpisodeEvent {
    pub episode_id: EpisodeId,
    pub event_id: FactId,
    pub field: EventField,
}

/// One directed row of `fact_relationship`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactRelationship {
    pub domain_1: FactDomain,
    pub fact_1: FactId,
    pub domain_2: FactDomain,
    pub fact_2: FactId,
    pub relationship_concept_id: ConceptId,
}

impl FactRelationship {
    /// The same link seen from the other end, carrying the inverse concept.
    pub fn mirrored(self, inverse_concept: ConceptId) -> Self {
        Self {
            domain_1: self.domain_2,
            fact_1: self.fact_2,
            domain_2: self.domain_1,
            fact_2: self.fact_1,
            relationship_concept_id: inverse_concept,
        }
    }
}

/// Hospital registered as a care site (one per data access group).
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct CareSite {
    #[serde(rename = "data_access_group_name")]
    pub name: String,
    #[serde(rename = "data_access_group_id", deserialize_with = "code_text")]
    pub code: String,
}

fn code_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(i64),
    }
    let code = <Code as serde::Deserialize>::deserialize(deserializer)?;
    Ok(match code {
        Code::Text(text) => text.trim().to_string(),
        Code::Number(number) => number.to_string(),
    })
}
