//! The `sepsis-cdm.toml` configuration file.
//!
//! ```toml
//! [paths]
//! forms_dir = "exports"
//! database = "cdm.sqlite"
//!
//! [registry]
//! name = "MEPRAM-Sepsis"
//!
//! [defaults]
//! focus = "12"
//! ```
//!
//! Every table and key is optional. Relative paths are resolved against the
//! directory holding the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cdm_load::LoadSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "sepsis-cdm.toml";

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "SEPSIS_CDM_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathSettings,
    #[serde(flatten)]
    pub load: LoadSettings,
}

// ============================================================================
// Paths
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Directory holding one `<form>.csv` export per form.
    pub forms_dir: PathBuf,
    /// Concept table (`variable;semantic_link;value_link;...`).
    pub concept_table: PathBuf,
    /// ATC to RxNorm cross-reference.
    pub drug_codes: PathBuf,
    /// Athena vocabulary download.
    pub vocabulary_dir: PathBuf,
    /// SQLite file holding the CDM tables.
    pub database: PathBuf,
    /// Output of the validation pass.
    pub invalid_fields: Option<PathBuf>,
    /// Hospital list exported as data access groups.
    pub care_sites: Option<PathBuf>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            forms_dir: PathBuf::from("exports"),
            concept_table: PathBuf::from("standards/concept_table.csv"),
            drug_codes: PathBuf::from("standards/atc_rxnorm.csv"),
            vocabulary_dir: PathBuf::from("standards/vocabulary"),
            database: PathBuf::from("cdm.sqlite"),
            invalid_fields: None,
            care_sites: None,
        }
    }
}

impl PathSettings {
    /// Anchor relative paths at `base`.
    fn resolve_against(&mut self, base: &Path) {
        for path in [
            &mut self.forms_dir,
            &mut self.concept_table,
            &mut self.drug_codes,
            &mut self.vocabulary_dir,
            &mut self.database,
        ] {
            anchor(path, base);
        }
        for path in [&mut self.invalid_fields, &mut self.care_sites]
            .into_iter()
            .flatten()
        {
            anchor(path, base);
        }
    }
}

fn anchor(path: &mut PathBuf, base: &Path) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

/// Read and parse a configuration file.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read configuration: {}", path.display()))?;
    let mut config: AppConfig = toml::from_str(&text)
        .with_context(|| format!("parse configuration: {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    config.paths.resolve_against(base);
    debug!(path = %path.display(), registry = %config.load.registry.name, "configuration loaded");
    Ok(config)
}
