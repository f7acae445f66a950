//! Per-form progress bars.

use std::io::{self, IsTerminal};

use cdm_load::{FormSummary, GroupOutcome, LoadObserver};
use cdm_model::FormKind;
use indicatif::{ProgressBar, ProgressStyle};

const FORM_TEMPLATE: &str = "{spinner:.green} {prefix:<52} [{bar:30.cyan/blue}] {pos}/{len} {msg}";

/// Draws one bar per form on stderr. Bars are hidden when stderr is not a
/// terminal, so redirected logs stay clean.
#[derive(Debug)]
pub struct ProgressObserver {
    visible: bool,
    current: Option<ProgressBar>,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            visible: io::stderr().is_terminal(),
            current: None,
        }
    }

    pub fn hidden() -> Self {
        Self {
            visible: false,
            current: None,
        }
    }

    fn bar(&self, groups: usize) -> ProgressBar {
        if !self.visible {
            return ProgressBar::hidden();
        }
        let style = ProgressStyle::with_template(FORM_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        ProgressBar::new(groups as u64).with_style(style)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadObserver for ProgressObserver {
    fn form_started(&mut self, form: FormKind, groups: usize) {
        let bar = self.bar(groups).with_prefix(form.label());
        self.current = Some(bar);
    }

    fn group_finished(&mut self, _form: FormKind, outcome: GroupOutcome) {
        if let Some(bar) = &self.current {
            if outcome == GroupOutcome::Failed {
                bar.set_message("with failures");
            }
            bar.inc(1);
        }
    }

    fn form_finished(&mut self, summary: &FormSummary) {
        if let Some(bar) = self.current.take() {
            bar.finish_with_message(format!(
                "{} loaded, {} failed",
                summary.loaded, summary.failed
            ));
        }
    }
}
