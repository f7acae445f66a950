//! Record Source: yields each form's records grouped by subject.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use cdm_model::{FormKind, SUBJECT_FIELD, SourceRecord, SubjectId};
use tracing::{debug, warn};

use crate::csv_table::{is_bookkeeping_column, read_csv_table};

/// All records of one form for one subject, in export order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectGroup {
    pub subject: SubjectId,
    pub records: Vec<SourceRecord>,
}

pub trait RecordSource {
    /// Records of `form`, grouped by subject in first-seen order.
    fn groups(&self, form: FormKind) -> Result<Vec<SubjectGroup>>;
}

/// Reads `<dir>/<form>.csv` exports.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    dir: PathBuf,
}

impl CsvRecordSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn form_path(&self, form: FormKind) -> PathBuf {
        self.dir.join(format!("{}.csv", form.name()))
    }

    /// Read one export. A missing file means the form has no records and a
    /// row without a subject id is skipped.
    pub fn read_records(&self, form: FormKind) -> Result<Vec<SourceRecord>> {
        let path = self.form_path(form);
        if !path.is_file() {
            warn!(form = %form, path = %path.display(), "form export not found");
            return Ok(Vec::new());
        }
        let table = read_csv_table(&path)?;
        let Some(subject_idx) = table.column_index(SUBJECT_FIELD) else {
            bail!("{} has no {SUBJECT_FIELD} column", path.display());
        };

        let columns: Vec<(usize, &str)> = table
            .headers
            .iter()
            .enumerate()
            .filter(|(idx, header)| *idx != subject_idx && !is_bookkeeping_column(header))
            .map(|(idx, header)| (idx, header.as_str()))
            .collect();

        let mut records = Vec::with_capacity(table.rows.len());
        for (line, row) in table.rows.iter().enumerate() {
            let Ok(subject) = SubjectId::new(row[subject_idx].as_str()) else {
                warn!(
                    form = %form,
                    path = %path.display(),
                    row = line + 2,
                    "skipping row without {SUBJECT_FIELD}"
                );
                continue;
            };
            let cells = columns
                .iter()
                .map(|&(idx, header)| (header, row[idx].as_str()));
            records.push(SourceRecord::new(form, subject, cells));
        }
        debug!(form = %form, records = records.len(), "read form export");
        Ok(records)
    }
}

impl RecordSource for CsvRecordSource {
    fn groups(&self, form: FormKind) -> Result<Vec<SubjectGroup>> {
        Ok(group_by_subject(self.read_records(form)?))
    }
}

/// Group records by subject, keeping the order in which subjects first appear.
pub fn group_by_subject(records: Vec<SourceRecord>) -> Vec<SubjectGroup> {
    let mut groups: Vec<SubjectGroup> = Vec::new();
    let mut index: HashMap<SubjectId, usize> = HashMap::new();
    for record in records {
        match index.get(&record.subject) {
            Some(&slot) => groups[slot].records.push(record),
            None => {
                index.insert(record.subject.clone(), groups.len());
                groups.push(SubjectGroup {
                    subject: record.subject.clone(),
                    records: vec![record],
                });
            }
        }
    }
    groups
}
