//! The load run.
//!
//! # Stages
//!
//! 1. **Care sites** - register hospitals from the configured list
//! 2. **Forms** - every form in load order, one transaction per (subject, form) group
//! 3. **Quality** - flag tracker rows named in the invalid-field report
//! 4. **Relationships** - link focus conditions to empirical treatments
//!
//! A group that fails rolls back on its own and the run continues; only
//! failures to read an export or reach the store stop the run.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use cdm_ingest::{RecordSource, SubjectGroup, retain_loadable};
use cdm_model::{CareSite, FormKind, InvalidFieldReport, SubjectId};
use cdm_store::registries::insert_care_sites;
use cdm_store::{
    Connection, QualityUpdate, StoreError, apply_invalid_report, is_processed, mark_processed,
    resolve_or_allocate,
};
use tracing::{debug, info, info_span, warn};

use crate::context::LoadContext;
use crate::error::LoadError;
use crate::forms::rule_for;
use crate::relationships::{EpisodeLinks, link_episode_treatments};
use crate::scope::{FactTally, SubjectScope};

// ============================================================================
// Progress reporting
// ============================================================================

/// What happened to one (subject, form) group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOutcome {
    Loaded,
    AlreadyProcessed,
    Blank,
    Failed,
}

/// Receives progress events while a run is in flight.
pub trait LoadObserver {
    fn form_started(&mut self, _form: FormKind, _groups: usize) {}

    fn group_finished(&mut self, _form: FormKind, _outcome: GroupOutcome) {}

    fn form_finished(&mut self, _summary: &FormSummary) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl LoadObserver for NoopObserver {}

// ============================================================================
// Summaries
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSummary {
    pub form: FormKind,
    pub loaded: usize,
    pub already_processed: usize,
    pub blank: usize,
    pub failed: usize,
    pub facts: FactTally,
}

impl FormSummary {
    pub fn new(form: FormKind) -> Self {
        Self {
            form,
            loaded: 0,
            already_processed: 0,
            blank: 0,
            failed: 0,
            facts: FactTally::default(),
        }
    }

    pub fn groups(&self) -> usize {
        self.loaded + self.already_processed + self.blank + self.failed
    }

    fn count(&mut self, outcome: GroupOutcome) {
        match outcome {
            GroupOutcome::Loaded => self.loaded += 1,
            GroupOutcome::AlreadyProcessed => self.already_processed += 1,
            GroupOutcome::Blank => self.blank += 1,
            GroupOutcome::Failed => self.failed += 1,
        }
    }
}

/// A group that was rolled back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    pub subject: SubjectId,
    pub form: FormKind,
    pub kind: &'static str,
    pub message: String,
    /// `message` with source values left out.
    pub redacted_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub care_sites_added: usize,
    pub forms: Vec<FormSummary>,
    pub failures: Vec<RecordFailure>,
    pub quality: Option<QualityUpdate>,
    pub episode_links: EpisodeLinks,
}

impl LoadSummary {
    pub fn total_loaded(&self) -> usize {
        self.forms.iter().map(|form| form.loaded).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.forms.iter().map(|form| form.failed).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn facts(&self) -> FactTally {
        let mut tally = FactTally::default();
        for form in &self.forms {
            tally.merge(&form.facts);
        }
        tally
    }
}

// ============================================================================
// Loader
// ============================================================================

enum GroupResult {
    Loaded(FactTally),
    AlreadyProcessed,
    Blank,
}

pub struct Loader<'a> {
    ctx: &'a LoadContext,
    forms: Vec<FormKind>,
    care_sites: Vec<CareSite>,
    invalid_fields: Option<InvalidFieldReport>,
    processed_on: NaiveDate,
}

impl<'a> Loader<'a> {
    pub fn new(ctx: &'a LoadContext) -> Self {
        Self {
            ctx,
            forms: FormKind::ALL.to_vec(),
            care_sites: Vec::new(),
            invalid_fields: None,
            processed_on: Local::now().date_naive(),
        }
    }

    /// Restrict the run to some forms. Load order is kept regardless of the
    /// order given.
    #[must_use]
    pub fn with_forms(mut self, forms: &[FormKind]) -> Self {
        self.forms = FormKind::ALL
            .into_iter()
            .filter(|form| forms.contains(form))
            .collect();
        self
    }

    #[must_use]
    pub fn with_care_sites(mut self, sites: Vec<CareSite>) -> Self {
        self.care_sites = sites;
        self
    }

    #[must_use]
    pub fn with_invalid_fields(mut self, report: InvalidFieldReport) -> Self {
        self.invalid_fields = Some(report);
        self
    }

    /// Date written to the tracker for loaded groups.
    #[must_use]
    pub fn with_processed_date(mut self, date: NaiveDate) -> Self {
        self.processed_on = date;
        self
    }

    pub fn forms(&self) -> &[FormKind] {
        &self.forms
    }

    pub fn run(
        &self,
        conn: &mut Connection,
        source: &dyn RecordSource,
        observer: &mut dyn LoadObserver,
    ) -> Result<LoadSummary> {
        let span = info_span!("load", registry = %self.ctx.registry());
        let _guard = span.enter();
        let mut summary = LoadSummary::default();

        if !self.care_sites.is_empty() {
            summary.care_sites_added =
                insert_care_sites(conn, &self.care_sites).context("register care sites")?;
            info!(added = summary.care_sites_added, "care sites registered");
        }

        for &form in &self.forms {
            let groups = source
                .groups(form)
                .with_context(|| format!("read {form} export"))?;
            let form_summary = self.load_form(conn, form, groups, observer, &mut summary.failures)?;
            summary.forms.push(form_summary);
        }

        if let Some(report) = &self.invalid_fields {
            let update = apply_invalid_report(conn, report).context("apply invalid-field report")?;
            info!(
                flagged = update.flagged,
                untracked = update.untracked,
                "quality flags applied"
            );
            summary.quality = Some(update);
        }

        summary.episode_links = self.link_episodes(conn)?;
        info!(
            loaded = summary.total_loaded(),
            failed = summary.total_failed(),
            "load complete"
        );
        Ok(summary)
    }

    fn load_form(
        &self,
        conn: &mut Connection,
        form: FormKind,
        groups: Vec<SubjectGroup>,
        observer: &mut dyn LoadObserver,
        failures: &mut Vec<RecordFailure>,
    ) -> Result<FormSummary> {
        let span = info_span!("form", form = %form);
        let _guard = span.enter();
        observer.form_started(form, groups.len());

        let mut summary = FormSummary::new(form);
        for group in groups {
            let subject = group.subject.clone();
            let outcome = match self.load_group(conn, form, group) {
                Ok(GroupResult::Loaded(facts)) => {
                    summary.facts.merge(&facts);
                    GroupOutcome::Loaded
                }
                Ok(GroupResult::AlreadyProcessed) => GroupOutcome::AlreadyProcessed,
                Ok(GroupResult::Blank) => GroupOutcome::Blank,
                Err(LoadError::Store(StoreError::Transaction { source })) => {
                    return Err(source).context("store transaction");
                }
                Err(error) => {
                    let redacted_message = error.redacted_message();
                    warn!(subject = %subject, reason = %redacted_message, "record rolled back");
                    failures.push(RecordFailure {
                        subject,
                        form,
                        kind: error.kind(),
                        message: error.to_string(),
                        redacted_message,
                    });
                    GroupOutcome::Failed
                }
            };
            summary.count(outcome);
            observer.group_finished(form, outcome);
        }

        info!(
            loaded = summary.loaded,
            already_processed = summary.already_processed,
            blank = summary.blank,
            failed = summary.failed,
            "form complete"
        );
        observer.form_finished(&summary);
        Ok(summary)
    }

    /// Load one group atomically. The tracker mark commits with the facts,
    /// so a rolled back group is retried on the next run.
    fn load_group(
        &self,
        conn: &mut Connection,
        form: FormKind,
        group: SubjectGroup,
    ) -> Result<GroupResult, LoadError> {
        let subject = group.subject;
        if is_processed(conn, &subject, form.name())? {
            debug!(subject = %subject, "already processed");
            return Ok(GroupResult::AlreadyProcessed);
        }
        let records = retain_loadable(group.records);
        if records.is_empty() {
            debug!(subject = %subject, "no loadable records");
            return Ok(GroupResult::Blank);
        }

        let tx = conn
            .transaction()
            .map_err(|source| StoreError::Transaction { source })?;
        let person = resolve_or_allocate(&tx, self.ctx.registry(), &subject)?;
        let rule = rule_for(form);
        let mut scope = SubjectScope::new(&tx, self.ctx, &subject, person);
        for record in &records {
            rule(&mut scope, record)?;
        }
        let facts = scope.tally();
        mark_processed(&tx, &subject, form.name(), self.processed_on)?;
        tx.commit()
            .map_err(|source| StoreError::Transaction { source })?;
        debug!(subject = %subject, person_id = person.get(), facts = facts.total(), "group loaded");
        Ok(GroupResult::Loaded(facts))
    }

    fn link_episodes(&self, conn: &mut Connection) -> Result<EpisodeLinks> {
        let tx = conn.transaction().context("begin relationship pass")?;
        let links = link_episode_treatments(&tx, &self.ctx.resolver, self.ctx.registry())
            .context("link episode treatments")?;
        tx.commit().context("commit relationship pass")?;
        Ok(links)
    }
}
