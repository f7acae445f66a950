//! CLI argument definitions.

use std::path::PathBuf;

use cdm_model::FormKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use cdm_cli::config::{CONFIG_ENV, CONFIG_FILENAME};

#[derive(Parser)]
#[command(
    name = "sepsis-cdm",
    version,
    about = "Load MEPRAM sepsis registry exports into an OMOP CDM store",
    long_about = "Load MEPRAM sepsis registry exports into an OMOP CDM store.\n\n\
                  Each (subject, form) pair is loaded once, in its own transaction.\n\
                  Re-running over the same exports only loads what is new."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow source values (patient data) in logs and failure listings.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the form exports into the store.
    Run(RunArgs),

    /// List the forms in load order with their fields.
    Forms,

    /// Apply an invalid-field report to the processing tracker.
    Quality(QualityArgs),

    /// Print SHA-256 checksums of the mapping tables.
    Checksums(ConfigArgs),
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration file.
    #[arg(
        long = "config",
        value_name = "PATH",
        env = CONFIG_ENV,
        default_value = CONFIG_FILENAME
    )]
    pub config: PathBuf,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Skip the confirmation prompt.
    #[arg(long = "yes", short = 'y')]
    pub yes: bool,

    /// Load only these forms (repeatable). Load order is kept.
    #[arg(long = "form", value_name = "FORM")]
    pub forms: Vec<FormKind>,
}

#[derive(Args)]
pub struct QualityArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Report to apply (default: `paths.invalid_fields` from the configuration).
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
