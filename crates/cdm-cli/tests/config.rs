//! Configuration files read from disk.

use std::fs;
use std::path::PathBuf;

use cdm_cli::config::{CONFIG_FILENAME, load_config};
use cdm_model::ConceptId;

#[test]
fn test_paths_resolve_against_config_dir() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(CONFIG_FILENAME);
    fs::write(
        &path,
        r#"
[paths]
forms_dir = "redcap"
database = "/var/lib/mepram/cdm.sqlite"
invalid_fields = "reports/invalid.json"

[registry]
name = "MEPRAM-Test"

[defaults]
organism = 4000123
prior_treatment_days = 14
"#,
    )
    .expect("write config");

    let config = load_config(&path).expect("load config");
    assert_eq!(config.paths.forms_dir, dir.path().join("redcap"));
    assert_eq!(config.paths.database, PathBuf::from("/var/lib/mepram/cdm.sqlite"));
    assert_eq!(
        config.paths.invalid_fields,
        Some(dir.path().join("reports/invalid.json"))
    );
    assert_eq!(
        config.paths.concept_table,
        dir.path().join("standards/concept_table.csv")
    );
    assert_eq!(config.load.registry.name, "MEPRAM-Test");
    assert_eq!(config.load.defaults.organism, ConceptId::new(4_000_123));
    assert_eq!(config.load.defaults.prior_treatment_days, 14);
    assert_eq!(config.load.defaults.prior_treatment_lookback_days, 90);
}

#[test]
fn test_missing_file_names_the_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.toml");
    let error = load_config(&path).expect_err("missing file");
    assert!(format!("{error:#}").contains("absent.toml"));
}

#[test]
fn test_malformed_file_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(CONFIG_FILENAME);
    fs::write(&path, "[defaults]\nprior_treatment_days = \"many\"\n").expect("write config");
    let error = load_config(&path).expect_err("bad value");
    assert!(format!("{error:#}").contains("parse configuration"));
}
