//! deid command line runner.

use std::io::{self, IsTerminal};
use std::sync::Arc;

use clap::{ColorChoice, Parser};
use deid_cli::logging::{LogConfig, LogFormat, init_logging};
use deid_transform::{EventSink, TracingSink};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_apply, run_manifest, run_rules};
use crate::summary::print_summary;

/// Every pipeline succeeded.
const EXIT_OK: i32 = 0;
/// A pipeline reported validation failures or aborted.
const EXIT_FAILED: i32 = 1;
/// The manifest could not be loaded.
const EXIT_USAGE: i32 = 2;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(EXIT_FAILED);
    }
    let events: Arc<dyn EventSink> = Arc::new(TracingSink::new().with_data(cli.log_data));
    let exit_code = match cli.command {
        Command::Run(args) => match run_manifest(&args.manifest, &events) {
            Ok(runs) => {
                print_summary(&runs);
                if runs.iter().all(|run| run.succeeded()) {
                    EXIT_OK
                } else {
                    EXIT_FAILED
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                EXIT_USAGE
            }
        },
        Command::Apply(args) => {
            let run = run_apply(&args, &events);
            let succeeded = run.succeeded();
            print_summary(std::slice::from_ref(&run));
            if succeeded { EXIT_OK } else { EXIT_FAILED }
        }
        Command::Rules => {
            run_rules();
            EXIT_OK
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
