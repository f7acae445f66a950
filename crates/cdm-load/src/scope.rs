//! Per-subject state shared by the rules of one (subject, form) group.
//!
//! The scope owns the subject's person id and caches the facts that later
//! forms hang off: the admission date, the ER visit and the sepsis episode.
//! Each is read from the store on first use, and a missing one fails the
//! record with [`LoadError::MissingPrecondition`].

use chrono::NaiveDate;
use cdm_model::{
    ConceptId, EpisodeId, EventField, FactId, NewCondition, NewDrugExposure, NewEpisodeEvent,
    NewMeasurement, NewObservation, NewProcedure, NewSpecimen, PersonId, RelationshipKind,
    SubjectId, VisitId,
};
use cdm_standards::{Branch, ConceptResolver, NONE_VALUE};
use cdm_store::{Connection, facts, queries};

use crate::context::LoadContext;
use crate::error::{LoadError, Result};
use crate::relationships;
use crate::settings::LoadSettings;

/// Field whose semantic concept marks the admission-date observation.
pub const ADMISSION_FIELD: &str = "fecha_ingreso_urgencias";

/// Rows written while loading one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactTally {
    pub persons: usize,
    pub visits: usize,
    pub episodes: usize,
    pub conditions: usize,
    pub measurements: usize,
    pub observations: usize,
    pub procedures: usize,
    pub drug_exposures: usize,
    pub specimens: usize,
    pub episode_events: usize,
    pub relationships: usize,
}

impl FactTally {
    pub fn total(&self) -> usize {
        self.persons
            + self.visits
            + self.episodes
            + self.conditions
            + self.measurements
            + self.observations
            + self.procedures
            + self.drug_exposures
            + self.specimens
            + self.episode_events
            + self.relationships
    }

    pub fn merge(&mut self, other: &FactTally) {
        self.persons += other.persons;
        self.visits += other.visits;
        self.episodes += other.episodes;
        self.conditions += other.conditions;
        self.measurements += other.measurements;
        self.observations += other.observations;
        self.procedures += other.procedures;
        self.drug_exposures += other.drug_exposures;
        self.specimens += other.specimens;
        self.episode_events += other.episode_events;
        self.relationships += other.relationships;
    }
}

pub struct SubjectScope<'a> {
    conn: &'a Connection,
    ctx: &'a LoadContext,
    subject: &'a SubjectId,
    person: PersonId,
    admission: Option<NaiveDate>,
    visit: Option<VisitId>,
    episode: Option<EpisodeId>,
    tally: FactTally,
}

impl<'a> SubjectScope<'a> {
    pub fn new(
        conn: &'a Connection,
        ctx: &'a LoadContext,
        subject: &'a SubjectId,
        person: PersonId,
    ) -> Self {
        Self {
            conn,
            ctx,
            subject,
            person,
            admission: None,
            visit: None,
            episode: None,
            tally: FactTally::default(),
        }
    }

    pub fn conn(&self) -> &'a Connection {
        self.conn
    }

    pub fn person(&self) -> PersonId {
        self.person
    }

    pub fn subject(&self) -> &'a SubjectId {
        self.subject
    }

    pub fn resolver(&self) -> &'a ConceptResolver {
        &self.ctx.resolver
    }

    pub fn settings(&self) -> &'a LoadSettings {
        &self.ctx.settings
    }

    pub fn tally(&self) -> FactTally {
        self.tally
    }

    pub(crate) fn tally_mut(&mut self) -> &mut FactTally {
        &mut self.tally
    }

    // ------------------------------------------------------------------
    // Concept lookups
    // ------------------------------------------------------------------

    pub fn sem(&self, variable: &str, value: &str) -> Result<ConceptId> {
        Ok(self.resolver().resolve(variable, Branch::Semantic, value)?)
    }

    pub fn val(&self, variable: &str, value: &str) -> Result<ConceptId> {
        Ok(self.resolver().resolve(variable, Branch::Value, value)?)
    }

    pub fn unit(&self, variable: &str, value: &str) -> Result<ConceptId> {
        Ok(self.resolver().resolve(variable, Branch::Units, value)?)
    }

    pub fn op(&self, variable: &str, value: &str) -> Result<ConceptId> {
        Ok(self.resolver().resolve(variable, Branch::Operator, value)?)
    }

    /// Concept code of a value row, for variables whose categories stand
    /// for a numeric value.
    pub fn value_code(&self, variable: &str, value: &str) -> Result<&'a str> {
        Ok(self.resolver().resolve_code(variable, Branch::Value, value)?)
    }

    pub fn admission_concept(&self) -> Result<ConceptId> {
        self.sem(ADMISSION_FIELD, NONE_VALUE)
    }

    // ------------------------------------------------------------------
    // Preconditions
    // ------------------------------------------------------------------

    pub fn admission_date(&mut self) -> Result<NaiveDate> {
        if let Some(date) = self.admission {
            return Ok(date);
        }
        let concept = self.admission_concept()?;
        let date = queries::admission_date(self.conn, self.person, concept)?
            .ok_or(LoadError::MissingPrecondition {
                what: "admission date",
            })?;
        self.admission = Some(date);
        Ok(date)
    }

    pub fn visit(&mut self) -> Result<VisitId> {
        if let Some(visit) = self.visit {
            return Ok(visit);
        }
        let visit = queries::visit_for_person(self.conn, self.person)?
            .ok_or(LoadError::MissingPrecondition { what: "visit" })?;
        self.visit = Some(visit);
        Ok(visit)
    }

    pub fn episode(&mut self) -> Result<EpisodeId> {
        if let Some(episode) = self.episode {
            return Ok(episode);
        }
        let episode = queries::episode_for_person(self.conn, self.person)?
            .ok_or(LoadError::MissingPrecondition { what: "episode" })?;
        self.episode = Some(episode);
        Ok(episode)
    }

    pub(crate) fn remember_admission(&mut self, date: NaiveDate) {
        self.admission = Some(date);
    }

    pub(crate) fn remember_visit(&mut self, visit: VisitId) {
        self.visit = Some(visit);
    }

    pub(crate) fn remember_episode(&mut self, episode: EpisodeId) {
        self.episode = Some(episode);
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    pub fn condition(&mut self, row: &NewCondition) -> Result<FactId> {
        let id = facts::insert_condition(self.conn, row)?;
        self.tally.conditions += 1;
        Ok(id)
    }

    pub fn measurement(&mut self, row: &NewMeasurement) -> Result<FactId> {
        let id = facts::insert_measurement(self.conn, row)?;
        self.tally.measurements += 1;
        Ok(id)
    }

    pub fn observation(&mut self, row: &NewObservation) -> Result<FactId> {
        let id = facts::insert_observation(self.conn, row)?;
        self.tally.observations += 1;
        Ok(id)
    }

    pub fn procedure(&mut self, row: &NewProcedure) -> Result<FactId> {
        let id = facts::insert_procedure(self.conn, row)?;
        self.tally.procedures += 1;
        Ok(id)
    }

    pub fn drug_exposure(&mut self, row: &NewDrugExposure) -> Result<FactId> {
        let id = facts::insert_drug_exposure(self.conn, row)?;
        self.tally.drug_exposures += 1;
        Ok(id)
    }

    pub fn specimen(&mut self, row: &NewSpecimen) -> Result<FactId> {
        let id = facts::insert_specimen(self.conn, row)?;
        self.tally.specimens += 1;
        Ok(id)
    }

    /// Attach a fact to the subject's episode under `field`.
    pub fn attach_to_episode(&mut self, fact: FactId, field: EventField) -> Result<()> {
        let episode = self.episode()?;
        facts::insert_episode_event(
            self.conn,
            &NewEpisodeEvent {
                episode_id: episode,
                event_id: fact,
                field,
            },
        )?;
        self.tally.episode_events += 1;
        Ok(())
    }

    /// Link two facts in both directions.
    pub fn link(&mut self, kind: RelationshipKind, first: FactId, second: FactId) -> Result<()> {
        let written = relationships::link(self.conn, self.resolver(), kind, first, second)?;
        self.tally.relationships += written;
        Ok(())
    }
}
