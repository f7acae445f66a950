#![deny(unsafe_code)]

use std::collections::BTreeMap;

use crate::form::{CHECKBOX_SEPARATOR, FormKind};
use crate::ids::SubjectId;

/// One exported row of a form, restricted to the form's declared fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub form: FormKind,
    pub subject: SubjectId,
    values: BTreeMap<String, String>,
}

impl SourceRecord {
    /// Build a record, keeping only declared columns. Cells are trimmed.
    pub fn new<I, K, V>(form: FormKind, subject: SubjectId, cells: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let values = cells
            .into_iter()
            .map(|(key, value)| (key.into(), value.as_ref().trim().to_string()))
            .filter(|(key, _)| form.declares(key))
            .collect();
        Self {
            form,
            subject,
            values,
        }
    }

    /// Non-empty value of a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .get(field)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Iterate over all declared cells, empty ones included.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Option codes ticked in a checkbox group, in numeric order.
    pub fn checked_options(&self, group: &str) -> Vec<String> {
        let mut options: Vec<(u32, String)> = self
            .values
            .iter()
            .filter(|(_, value)| value.as_str() == "1")
            .filter_map(|(key, _)| {
                let (prefix, option) = key.split_once(CHECKBOX_SEPARATOR)?;
                if prefix != group {
                    return None;
                }
                let rank = option.parse::<u32>().ok()?;
                Some((rank, option.to_string()))
            })
            .collect();
        options.sort_by_key(|(rank, _)| *rank);
        options.into_iter().map(|(_, option)| option).collect()
    }
}
