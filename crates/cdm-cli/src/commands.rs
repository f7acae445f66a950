use std::io;
use std::path::Path;

use anyhow::{Context, Result, bail};
use comfy_table::Table;
use tracing::{info, info_span};

use cdm_cli::config::{AppConfig, load_config};
use cdm_cli::gate::confirm;
use cdm_cli::progress::ProgressObserver;
use cdm_cli::summary::{apply_table_style, header_cell};
use cdm_ingest::{CsvRecordSource, load_care_sites, load_invalid_fields};
use cdm_load::{LoadContext, LoadSummary, Loader};
use cdm_model::FormKind;
use cdm_standards::{ConceptResolver, file_sha256};
use cdm_store::{QualityUpdate, apply_invalid_report, open_store};

use crate::cli::{ConfigArgs, QualityArgs, RunArgs};

pub fn run_forms() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Form"),
        header_cell("Description"),
        header_cell("Fields"),
    ]);
    apply_table_style(&mut table);
    for (position, form) in FormKind::ALL.into_iter().enumerate() {
        let mut fields = form.fields().join(", ");
        if let Some(group) = form.checkbox_group() {
            fields.push_str(&format!(", {group}___*"));
        }
        table.add_row(vec![
            (position + 1).to_string(),
            form.name().to_string(),
            form.label().to_string(),
            fields,
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Load the exports. Returns `None` when the confirmation gate was declined.
pub fn run_load(args: &RunArgs) -> Result<Option<LoadSummary>> {
    let config = load_config(&args.config.config)?;
    let span = info_span!("run", registry = %config.load.registry.name);
    let _guard = span.enter();

    let resolver = load_standards(&config)?;
    let ctx = LoadContext::new(resolver).with_settings(config.load.clone());

    let mut loader = Loader::new(&ctx);
    if !args.forms.is_empty() {
        loader = loader.with_forms(&args.forms);
    }
    if let Some(path) = &config.paths.care_sites {
        loader = loader.with_care_sites(load_care_sites(path)?);
    }
    if let Some(path) = &config.paths.invalid_fields {
        loader = loader.with_invalid_fields(load_invalid_fields(path)?);
    }

    print_plan(&config, &loader);
    if !args.yes {
        let stdin = io::stdin();
        let confirmed = confirm("Proceed with the load?", stdin.lock(), io::stdout())
            .context("read confirmation")?;
        if !confirmed {
            info!("load declined at the confirmation prompt");
            return Ok(None);
        }
    }

    let mut conn = open_store(&config.paths.database).context("open CDM store")?;
    let source = CsvRecordSource::new(&config.paths.forms_dir);
    let mut observer = ProgressObserver::new();
    let summary = loader.run(&mut conn, &source, &mut observer)?;
    Ok(Some(summary))
}

pub fn run_quality(args: &QualityArgs) -> Result<QualityUpdate> {
    let config = load_config(&args.config.config)?;
    let Some(path) = args
        .report
        .as_deref()
        .or(config.paths.invalid_fields.as_deref())
    else {
        bail!("no invalid-field report: pass --report or set paths.invalid_fields");
    };
    let report = load_invalid_fields(path)?;
    let mut conn = open_store(&config.paths.database).context("open CDM store")?;
    let tx = conn.transaction().context("begin quality update")?;
    let update = apply_invalid_report(&tx, &report).context("apply invalid-field report")?;
    tx.commit().context("commit quality update")?;
    info!(
        subjects = report.subject_count(),
        flagged = update.flagged,
        "quality flags applied"
    );
    Ok(update)
}

pub fn run_checksums(args: &ConfigArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Path"),
        header_cell("SHA-256"),
    ]);
    apply_table_style(&mut table);
    for (label, path) in [
        ("concept table", &config.paths.concept_table),
        ("drug codes", &config.paths.drug_codes),
    ] {
        let digest = file_sha256(path).with_context(|| format!("checksum {label}"))?;
        table.add_row(vec![
            label.to_string(),
            path.display().to_string(),
            digest,
        ]);
    }
    println!("{table}");
    Ok(())
}

fn load_standards(config: &AppConfig) -> Result<ConceptResolver> {
    let paths = &config.paths;
    let resolver =
        ConceptResolver::load(&paths.concept_table, &paths.drug_codes, &paths.vocabulary_dir)
            .context("load standards")?;
    info!(
        mappings = resolver.table().len(),
        concepts = resolver.vocabulary().concept_count(),
        drug_codes = resolver.drugs().len(),
        "standards loaded"
    );
    Ok(resolver)
}

fn print_plan(config: &AppConfig, loader: &Loader<'_>) {
    println!("Registry: {}", config.load.registry.name);
    println!("Exports:  {}", config.paths.forms_dir.display());
    println!("Store:    {}", display_path(&config.paths.database));
    let forms: Vec<&str> = loader.forms().iter().map(|form| form.name()).collect();
    println!("Forms:    {}", forms.join(", "));
}

fn display_path(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (new)", path.display())
    }
}
