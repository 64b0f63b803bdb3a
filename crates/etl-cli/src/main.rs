//! `etl` command-line tool.

use clap::{ColorChoice, Parser};
use etl_cli::logging::{LogConfig, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command};
use crate::commands::{run_entities, run_load, run_transform_command};
use crate::summary::{print_load_summary, print_transform_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match &cli.command {
        Command::Entities(args) => match run_entities(args) {
            Ok(()) => 0,
            Err(error) => report(&error),
        },
        Command::Load(args) => match run_load(args) {
            Ok(result) => {
                print_load_summary(&result, args.show_failures);
                i32::from(result.has_errors)
            }
            Err(error) => report(&error),
        },
        Command::Transform(args) => match run_transform_command(args) {
            Ok(result) => {
                print_transform_summary(&result);
                0
            }
            Err(error) => report(&error),
        },
    };
    std::process::exit(exit_code);
}

fn report(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

/// Logging configuration from the global flags. An explicit `-v/-q` or
/// `--log-level` wins over `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level = cli
        .log_level
        .map_or_else(|| cli.verbosity.tracing_level_filter(), LevelFilter::from);
    let mut config = LogConfig::default()
        .with_level(level)
        .with_format(cli.log_format.into())
        .with_log_file(cli.log_file.clone());
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
