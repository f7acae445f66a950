//! Relationship Builder.
//!
//! Every link is stored as two `fact_relationship` rows, the forward row and
//! its mirror carrying the inverse concept. Rows that already exist are not
//! written again.

use cdm_model::{EventField, FactId, FactRelationship, FormKind, RelationshipKind, concepts};
use cdm_standards::ConceptResolver;
use cdm_store::{Connection, facts, queries};
use tracing::{debug, info};

use crate::error::Result;

/// Write both rows of one link. Returns how many rows were new.
pub fn link(
    conn: &Connection,
    resolver: &ConceptResolver,
    kind: RelationshipKind,
    first: FactId,
    second: FactId,
) -> Result<usize> {
    let (domain_1, domain_2) = kind.domains();
    let forward = FactRelationship {
        domain_1,
        fact_1: first,
        domain_2,
        fact_2: second,
        relationship_concept_id: resolver.relationship(kind.forward())?,
    };
    let inverse = forward.mirrored(resolver.relationship(kind.inverse())?);

    let mut written = 0;
    for row in [forward, inverse] {
        if queries::relationship_exists(conn, &row)? {
            continue;
        }
        facts::insert_fact_relationship(conn, &row)?;
        written += 1;
    }
    debug!(kind = %kind, first = first.get(), second = second.get(), written, "linked facts");
    Ok(written)
}

/// Outcome of the episode relationship pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpisodeLinks {
    /// Subjects with a focus episode and a loaded empirical treatment.
    pub subjects: usize,
    /// Relationship rows written.
    pub rows: usize,
}

/// Link each focus condition of an infectious-disease episode to every
/// empirical treatment attached to the same episode.
pub fn link_episode_treatments(
    conn: &Connection,
    resolver: &ConceptResolver,
    registry: &str,
) -> Result<EpisodeLinks> {
    let candidates = queries::persons_for_episode_pass(
        conn,
        registry,
        FormKind::Sepsis.name(),
        FormKind::EmpiricalTreatment.name(),
        concepts::INFECTIOUS_DISEASE,
    )?;

    let mut links = EpisodeLinks::default();
    for candidate in candidates {
        let conditions = queries::episode_event_ids(conn, candidate.episode_id, EventField::Condition)?;
        let drugs = queries::episode_event_ids(conn, candidate.episode_id, EventField::Drug)?;
        if conditions.is_empty() || drugs.is_empty() {
            continue;
        }
        links.subjects += 1;
        for &condition in &conditions {
            for &drug in &drugs {
                links.rows += link(
                    conn,
                    resolver,
                    RelationshipKind::InfectiousDiseaseEpisode,
                    condition,
                    drug,
                )?;
            }
        }
    }
    info!(
        subjects = links.subjects,
        rows = links.rows,
        "episode relationship pass complete"
    );
    Ok(links)
}
