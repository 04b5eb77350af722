//! Run configuration.
//!
//! Configuration is read from an optional TOML file; every field has a
//! default so an empty file (or no file) is valid.
//!
//! ```toml
//! input_dir = "./raw-data"
//! output_dir = "./processed-data"
//! files = ["data_01.csv", "data_02.csv"]
//! output_format = "parquet"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::star::PREVIOUS_OWNERS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Physical encoding of output tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Parquet,
    Csv,
}

impl OutputFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Parquet => "parquet",
            Self::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    /// Folder holding the input batches.
    pub input_dir: PathBuf,
    /// Folder receiving one sub-folder per output table.
    pub output_dir: PathBuf,
    /// Batches to process, in order. Empty means every CSV in `input_dir`.
    pub files: Vec<String>,
    /// Raw columns dropped before modeling.
    pub dropped_columns: Vec<String>,
    pub output_format: OutputFormat,
    /// Extract the dimensions of a batch on separate threads.
    pub parallel_dimensions: bool,
    /// Keep processing later batches after one fails.
    pub continue_on_error: bool,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./raw-data"),
            output_dir: PathBuf::from("./processed-data"),
            files: Vec::new(),
            dropped_columns: vec![PREVIOUS_OWNERS.to_string()],
            output_format: OutputFormat::default(),
            parallel_dimensions: true,
            continue_on_error: false,
        }
    }
}

impl EtlConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = EtlConfig::from_toml_str("").expect("parse empty config");
        assert_eq!(config, EtlConfig::default());
        assert_eq!(config.dropped_columns, vec!["previous_owners".to_string()]);
    }

    #[test]
    fn partial_config_overrides_fields() {
        let config = EtlConfig::from_toml_str(
            r#"
            output_dir = "out"
            files = ["data_02.csv", "data_01.csv"]
            output_format = "csv"
            continue_on_error = true
            "#,
        )
        .expect("parse config");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.files, vec!["data_02.csv", "data_01.csv"]);
        assert_eq!(config.output_format, OutputFormat::Csv);
        assert!(config.continue_on_error);
        assert!(config.parallel_dimensions);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(EtlConfig::from_toml_str("output_format = \"orc\"").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = EtlConfig::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
