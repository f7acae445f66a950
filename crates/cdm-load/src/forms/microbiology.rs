//! The organism chain shared by every culture form.
//!
//! culture measurement <- organism observation <- resistance observation <- phenotype measurements
//!
//! Each arrow is an event link on the later fact. Culture forms loaded
//! during the admission also attach every fact to the sepsis episode.

use chrono::NaiveDate;
use cdm_model::{
    ConceptId, EventField, EventLink, FactId, NewMeasurement, NewObservation, SourceRecord,
    VisitId,
};

use crate::error::Result;
use crate::scope::SubjectScope;

/// Value of the resistance field that marks a multidrug-resistant organism.
const RESISTANT: &str = "1";

/// Column names of the chain on one form.
#[derive(Debug, Clone, Copy)]
pub(super) struct ChainFields {
    pub organism: &'static str,
    pub resistance: &'static str,
    pub phenotypes: &'static str,
}

/// Where chain facts are placed besides their event links.
#[derive(Debug, Clone, Copy)]
pub(super) struct Placement {
    pub visit: Option<VisitId>,
    pub on_episode: bool,
}

impl Placement {
    pub const HISTORY: Placement = Placement {
        visit: None,
        on_episode: false,
    };

    pub fn admission(visit: VisitId) -> Self {
        Self {
            visit: Some(visit),
            on_episode: true,
        }
    }
}

/// Organism concept: the SNOMED code's standard concept, or the configured
/// default when no organism was recorded.
pub(super) fn organism_concept(scope: &SubjectScope<'_>, code: Option<&str>) -> Result<ConceptId> {
    match code {
        Some(code) => Ok(scope.resolver().standard_concept("SNOMED", code)?),
        None => Ok(scope.settings().defaults.organism),
    }
}

/// Write the organism, resistance and phenotype facts that follow `culture`.
/// Returns the organism observation.
pub(super) fn write_organism_chain(
    scope: &mut SubjectScope<'_>,
    record: &SourceRecord,
    fields: ChainFields,
    culture: FactId,
    date: NaiveDate,
    placement: Placement,
) -> Result<FactId> {
    let code = record.get(fields.organism);
    let organism_concept = organism_concept(scope, code)?;
    let organism = NewObservation::new(scope.person(), organism_concept, date)
        .with_value_source(code)
        .with_event(EventLink::new(culture, EventField::Measurement))
        .with_visit(placement.visit);
    let organism = scope.observation(&organism)?;
    if placement.on_episode {
        scope.attach_to_episode(organism, EventField::Observation)?;
    }

    if record.get(fields.resistance) != Some(RESISTANT) {
        return Ok(organism);
    }
    let resistance = NewObservation::new(
        scope.person(),
        scope.sem(fields.resistance, RESISTANT)?,
        date,
    )
    .with_value_source(Some(RESISTANT))
    .with_event(EventLink::new(organism, EventField::Observation))
    .with_visit(placement.visit);
    let resistance = scope.observation(&resistance)?;
    if placement.on_episode {
        scope.attach_to_episode(resistance, EventField::Observation)?;
    }

    let lineage = &scope.settings().resistance;
    for option in record.checked_options(fields.phenotypes) {
        let concept = if option == lineage.option
            && scope.resolver().has_ancestor(organism_concept, lineage.ancestor)
        {
            lineage.phenotype
        } else {
            scope.sem(fields.phenotypes, &option)?
        };
        let row = NewMeasurement::new(scope.person(), concept, date)
            .with_value_concept(scope.val(fields.phenotypes, &option)?)
            .with_event(EventLink::new(resistance, EventField::Observation))
            .with_visit(placement.visit)
            .with_source(fields.phenotypes, Some(&option));
        let phenotype = scope.measurement(&row)?;
        if placement.on_episode {
            scope.attach_to_episode(phenotype, EventField::Measurement)?;
        }
    }
    Ok(organism)
}
