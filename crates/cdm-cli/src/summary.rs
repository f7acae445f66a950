use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use cdm_load::{FormSummary, LoadSummary, RecordFailure};
use cdm_store::QualityUpdate;
use tracing::debug;

use crate::logging::{log_data_enabled, redact_value};

pub fn print_load_summary(summary: &LoadSummary) {
    println!("{}", form_table(summary));
    if summary.care_sites_added > 0 {
        println!("Care sites added: {}", summary.care_sites_added);
    }
    println!(
        "Episode links: {} subjects, {} rows",
        summary.episode_links.subjects, summary.episode_links.rows
    );
    if let Some(update) = summary.quality {
        print_quality(update);
    }
    if summary.has_failures() {
        for failure in &summary.failures {
            debug!(
                subject = %failure.subject,
                form = %failure.form,
                detail = failure_detail(failure),
                "record failure"
            );
        }
        eprintln!("Failures:");
        for line in failure_lines(&summary.failures, log_data_enabled()) {
            eprintln!("- {line}");
        }
    }
}

pub fn print_quality(update: QualityUpdate) {
    println!(
        "Quality flags: {} marked invalid, {} not tracked",
        update.flagged, update.untracked
    );
}

pub fn form_table(summary: &LoadSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Form"),
        header_cell("Description"),
        header_cell("Loaded"),
        header_cell("Skipped"),
        header_cell("Blank"),
        header_cell("Failed"),
        header_cell("Facts"),
    ]);
    apply_summary_table_style(&mut table);
    for column in 2..7 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for form in &summary.forms {
        table.add_row(form_row(form));
    }
    let facts = summary.facts();
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(summary.total_loaded()).add_attribute(Attribute::Bold),
        Cell::new(summary.forms.iter().map(|f| f.already_processed).sum::<usize>()),
        Cell::new(summary.forms.iter().map(|f| f.blank).sum::<usize>()),
        count_cell(summary.total_failed(), Color::Red).add_attribute(Attribute::Bold),
        Cell::new(facts.total()).add_attribute(Attribute::Bold),
    ]);
    table
}

fn form_row(form: &FormSummary) -> Vec<Cell> {
    vec![
        Cell::new(form.form.name())
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(form.form.label()),
        Cell::new(form.loaded),
        dim_cell(form.already_processed),
        dim_cell(form.blank),
        count_cell(form.failed, Color::Red),
        Cell::new(form.facts.total()),
    ]
}

/// One line per rolled back group. Messages carry source values only when
/// data logging is on.
pub fn failure_lines(failures: &[RecordFailure], with_values: bool) -> Vec<String> {
    failures
        .iter()
        .map(|failure| {
            let message = if with_values {
                &failure.message
            } else {
                &failure.redacted_message
            };
            format!(
                "{} / {}: {} ({})",
                failure.subject, failure.form, message, failure.kind
            )
        })
        .collect()
}

/// Full failure message for log lines, redacted unless data logging is on.
pub fn failure_detail(failure: &RecordFailure) -> &str {
    redact_value(&failure.message)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
