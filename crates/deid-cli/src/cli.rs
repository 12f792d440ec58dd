//! CLI argument definitions for the deid runner.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use deid_ingest::InputFormat;
use deid_transform::RuleSpec;

#[derive(Parser)]
#[command(
    name = "deid",
    version,
    about = "Batch de-identification of tabular data",
    long_about = "Load CSV, JSON or spreadsheet files, apply ordered field-level\n\
                  de-identification rules (age banding, postcode trimming) and\n\
                  write the result as JSON records."
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

    /// Include raw cell values in validation failure logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run every job in a TOML manifest.
    Run(RunArgs),

    /// Run a single pipeline over one input file.
    Apply(ApplyArgs),

    /// List the available rules.
    Rules,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the job manifest.
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Input file (.csv, .json, .xlsx, .xls, .ods, ...).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output JSON file.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: PathBuf,

    /// Rule to apply, in order, as KIND:FIELD[,FIELD]... (repeatable).
    #[arg(long = "rule", short = 'r', value_name = "KIND:FIELDS")]
    pub rules: Vec<RuleSpec>,

    /// Correlation id used in logs.
    #[arg(long = "request-id", default_value = "adhoc")]
    pub request_id: String,

    /// Spaces per JSON indentation level (0 for compact output).
    #[arg(long = "indent", default_value_t = deid_output::DEFAULT_INDENT)]
    pub indent: usize,

    /// Input format, when the extension does not say.
    #[arg(long = "format", value_name = "FORMAT")]
    pub format: Option<InputFormat>,
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
