//! Side inputs delivered next to the form exports.

use std::path::Path;

use anyhow::{Context, Result};
use cdm_model::{CareSite, InvalidFieldReport};

/// Read the validation pass output: `{ "<subject>": ["form:field", ...] }`.
pub fn load_invalid_fields(path: &Path) -> Result<InvalidFieldReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read invalid-field report: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parse invalid-field report: {}", path.display()))
}

/// Read the hospital list exported as data access groups.
pub fn load_care_sites(path: &Path) -> Result<Vec<CareSite>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read care sites: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse care sites: {}", path.display()))
}
