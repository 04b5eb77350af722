//! Tracing subscriber setup for the `star-etl` binary.
//!
//! Workspace crates log at the level picked on the command line while polars
//! and other dependencies stay at `warn`. `RUST_LOG` replaces that filter
//! unless a level was given explicitly.
//!
//! # Log Levels
//!
//! - `error`: failed batches
//! - `warn`: unresolved dimension references, empty inputs
//! - `info`: batch progress and timing
//! - `debug`: per-table details (rows written, distinct dimension rows)

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

const WORKSPACE_CRATES: &[&str] = &[
    "star_cli",
    "star_core",
    "star_ingest",
    "star_model",
    "star_output",
];

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-field human-readable lines.
    #[default]
    Pretty,
    /// Single-line events.
    Compact,
    /// One JSON object per event, plus span close events with timings.
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` replace `level_filter`.
    pub use_env_filter: bool,
    pub format: LogFormat,
    pub timestamps: bool,
    pub ansi: bool,
    /// Append to this file instead of writing to stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::INFO,
            use_env_filter: true,
            format: LogFormat::default(),
            timestamps: false,
            ansi: true,
            log_file: None,
        }
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            init_logging_with_writer(config, Mutex::new(file));
        }
        None => init_logging_with_writer(config, io::stderr),
    }
    Ok(())
}

/// Install the global subscriber writing to `writer`.
pub fn init_logging_with_writer<W>(config: &LogConfig, writer: W)
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(format_layer(config, writer))
        .with(build_env_filter(config))
        .init();
}

fn format_layer<W>(config: &LogConfig, writer: W) -> BoxedLayer
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_target(false);
    match (config.format, config.timestamps) {
        (LogFormat::Json, _) => layer.json().with_span_events(FmtSpan::CLOSE).boxed(),
        (LogFormat::Compact, true) => layer.compact().with_ansi(config.ansi).boxed(),
        (LogFormat::Compact, false) => layer
            .compact()
            .with_ansi(config.ansi)
            .without_time()
            .boxed(),
        (LogFormat::Pretty, true) => layer.with_ansi(config.ansi).boxed(),
        (LogFormat::Pretty, false) => layer.with_ansi(config.ansi).without_time().boxed(),
    }
}

/// Directives for `level_filter`: workspace crates follow it, everything else
/// stays at warn.
fn filter_directives(level_filter: LevelFilter) -> String {
    let level = level_filter.to_string().to_lowercase();
    let mut directives = vec!["warn".to_string()];
    directives.extend(
        WORKSPACE_CRATES
            .iter()
            .map(|name| format!("{name}={level}")),
    );
    directives.join(",")
}

fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let fallback = || EnvFilter::new(filter_directives(config.level_filter));
    if config.use_env_filter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback())
    } else {
        fallback()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    /// Collects formatted output in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().expect("buffer").clone()).expect("utf8")
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn render(config: &LogConfig) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::registry().with(format_layer(config, captured.clone()));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(rows = 3, "table written");
        });
        captured.text()
    }

    fn plain(format: LogFormat, timestamps: bool) -> LogConfig {
        LogConfig {
            format,
            timestamps,
            ansi: false,
            ..LogConfig::default()
        }
    }

    #[test]
    fn directives_cover_workspace_crates() {
        let directives = filter_directives(LevelFilter::DEBUG);
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("star_core=debug"));
        assert!(directives.contains("star_output=debug"));
    }

    #[test]
    fn off_level_is_rendered() {
        assert!(filter_directives(LevelFilter::OFF).contains("star_cli=off"));
    }

    #[test]
    fn timestamps_lead_the_line_only_when_enabled() {
        let without = render(&plain(LogFormat::Compact, false));
        assert!(without.trim_start().starts_with("INFO"));
        assert!(without.contains("table written"));

        let with = render(&plain(LogFormat::Compact, true));
        assert!(with.starts_with(|c: char| c.is_ascii_digit()));
        assert!(with.contains("table written"));
    }

    #[test]
    fn json_events_carry_level_and_fields() {
        let output = render(&plain(LogFormat::Json, false));
        assert!(output.contains("\"level\":\"INFO\""));
        assert!(output.contains("\"rows\":3"));
    }
}
