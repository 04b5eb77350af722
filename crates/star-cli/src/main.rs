//! Property purchase star schema ETL.

use clap::{ColorChoice, Parser};
use star_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use star_cli::commands::{run, run_inspect, run_model};
use star_cli::logging::{LogConfig, LogFormat, init_logging};
use star_cli::summary::{failure_lines, print_summary};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let outcome = match cli.command {
        Command::Run(args) => run(&args).map(|result| {
            print_summary(&result);
            for line in failure_lines(&result) {
                eprintln!("error: {line}");
            }
            i32::from(result.has_errors())
        }),
        Command::Model => run_model().map(|()| 0),
        Command::Inspect(args) => run_inspect(&args).map(|()| 0),
    };
    let exit_code = outcome.unwrap_or_else(|error| {
        eprintln!("error: {error:#}");
        1
    });
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
    config.timestamps = cli.log_timestamps;
    config.log_file = cli.log_file.clone();
    config.ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
