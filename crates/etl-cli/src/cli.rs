//! CLI argument definitions for the ETL tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use etl_cli::logging::LogFormat;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "etl",
    version,
    about = "Schema-driven ETL - split, validate, transform and load tabular records",
    long_about = "Split wide tabular records into typed entities and load them.\n\n\
                  Records are reconciled against entity schemas, coerced to their\n\
                  declared types and written to SQLite. Transform pipelines declared\n\
                  in TOML run statistical stages over the raw table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// List registered entities and their declared columns.
    Entities(EntitiesArgs),

    /// Split, validate and load a record file.
    Load(LoadArgs),

    /// Run a transform pipeline over a record file.
    Transform(TransformArgs),
}

#[derive(Parser)]
pub struct EntitiesArgs {
    /// Extra schema declarations (TOML).
    #[arg(long = "schemas", value_name = "TOML")]
    pub schemas: Option<PathBuf>,
}

#[derive(Parser)]
pub struct LoadArgs {
    /// Source records: a CSV file with a header row, or a key=value file
    /// (`.kv`, `.env`, `.properties`) holding one record.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// SQLite database to load into (default: <INPUT> with a .db extension).
    #[arg(long = "db", value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Entity to split out; repeat for several (default: user, product,
    /// order, inventory, order_detail).
    #[arg(long = "entity", value_name = "NAME")]
    pub entities: Vec<String>,

    /// Extra schema declarations (TOML).
    #[arg(long = "schemas", value_name = "TOML")]
    pub schemas: Option<PathBuf>,

    /// Validate and report without writing to the database.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Number of coercion failures to list after the summary.
    #[arg(long = "show-failures", value_name = "N", default_value_t = 20)]
    pub show_failures: usize,
}

#[derive(Parser)]
pub struct TransformArgs {
    /// Source records (CSV or key=value file).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Pipeline declaration (TOML).
    #[arg(long = "pipeline", value_name = "TOML")]
    pub pipeline: PathBuf,

    /// Write the transformed table as CSV instead of printing a preview.
    #[arg(long = "output", value_name = "CSV")]
    pub output: Option<PathBuf>,

    /// Rows shown in the preview.
    #[arg(long = "preview-rows", value_name = "N", default_value_t = 10)]
    pub preview_rows: usize,
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

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
