//! CLI argument definitions for the star schema driver.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;
use star_model::OutputFormat;

#[derive(Parser)]
#[command(
    name = "star-etl",
    version,
    about = "Property purchase ETL - Build a star schema from CSV batches",
    long_about = "Read property-purchase CSV batches and write a star schema.\n\n\
                  Each batch appends to the fact table and replaces the dimension tables.\n\
                  Output is written as Parquet (default) or CSV."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

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

    /// Prefix log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Process CSV batches into the star schema.
    Run(RunArgs),

    /// Show the output tables, their write modes and columns.
    Model,

    /// Show row counts of the tables in an output directory.
    Inspect(InspectArgs),
}

#[derive(Parser, Default)]
pub struct RunArgs {
    /// Directory holding the raw CSV batches (default: ./raw-data).
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory the star schema tables are written to (default: ./processed-data).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Batch file to process; repeat to process several in order.
    ///
    /// Without this flag every CSV file in the input directory is processed
    /// in name order.
    #[arg(long = "file", value_name = "NAME")]
    pub files: Vec<String>,

    /// Output file format.
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormatArg>,

    /// Extract dimension tables one after another instead of in parallel.
    #[arg(long = "sequential")]
    pub sequential: bool,

    /// Continue with the remaining batches after a batch fails.
    #[arg(long = "keep-going")]
    pub keep_going: bool,

    /// TOML configuration file; command-line flags take precedence.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Directory holding the star schema tables (default: ./processed-data).
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Format the tables were written in.
    #[arg(long = "format", value_enum, default_value = "parquet")]
    pub format: OutputFormatArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Parquet,
    Csv,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(value: OutputFormatArg) -> Self {
        match value {
            OutputFormatArg::Parquet => OutputFormat::Parquet,
            OutputFormatArg::Csv => OutputFormat::Csv,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
