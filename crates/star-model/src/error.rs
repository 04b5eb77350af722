//! Error taxonomy for star schema batch processing.
//!
//! Schema and sink failures are fatal for the batch they occur in. Join
//! resolution gaps are not errors at all; see [`crate::quality`].

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::star::ColumnType;

/// The batch does not have the shape the model expects.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A column required by projection, a dimension, or the fact table is absent.
    #[error("column '{column}' required by {required_by} not found in batch")]
    MissingColumn { column: String, required_by: String },

    /// A column's values do not fit the type the model stores it as.
    #[error("column '{column}' holds {found} values, expected {expected}")]
    ColumnType {
        column: String,
        expected: ColumnType,
        found: String,
    },

    /// A dimension frame holds the same natural key twice.
    #[error("dimension table {table} has duplicate natural key at row {row}")]
    DuplicateNaturalKey { table: String, row: usize },

    /// A dimension frame holds the same surrogate key twice.
    #[error("dimension table {table} has duplicate surrogate key {key}")]
    DuplicateSurrogateKey { table: String, key: i64 },

    /// A surrogate key column holds a null or non-integer value.
    #[error("dimension table {table} has an invalid surrogate key at row {row}")]
    InvalidSurrogateKey { table: String, row: usize },
}

/// A record source could not supply a batch.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("batch not found: {batch_id}")]
    NotFound { batch_id: String },

    #[error("batch file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read batch {batch_id}: {source}")]
    Read {
        batch_id: String,
        #[source]
        source: PolarsError,
    },

    #[error("failed to list input directory {path}: {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A table sink failed to persist a table.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error writing {table} at {path}: {source}")]
    Io {
        table: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {table}: {source}")]
    Encode {
        table: String,
        #[source]
        source: PolarsError,
    },

    /// Appended rows do not match the table's existing schema.
    #[error("cannot append to {table}: {message}")]
    SchemaMismatch { table: String, message: String },

    #[error("sink rejected {table}: {message}")]
    Rejected { table: String, message: String },
}

/// Errors that abort one batch.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Source(#[from] SourceError),

    /// One table failed to write. `committed` lists tables of the same batch
    /// that were already written, so the output set may be inconsistent.
    #[error("write of {table} failed after committing [{}]: {source}", .committed.join(", "))]
    Sink {
        table: String,
        committed: Vec<String>,
        #[source]
        source: SinkError,
    },

    #[error("data frame operation failed: {0}")]
    Frame(#[from] PolarsError),

    #[error("dimension extraction worker panicked for {table}")]
    WorkerPanicked { table: String },

    #[error("surrogate keys exhausted for {table}")]
    KeysExhausted { table: String },
}

impl EtlError {
    /// True when a sink already persisted part of the batch.
    pub fn is_partial_write(&self) -> bool {
        matches!(self, Self::Sink { committed, .. } if !committed.is_empty())
    }
}

/// Result type for batch processing.
pub type Result<T> = std::result::Result<T, EtlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_display() {
        let err = SchemaError::MissingColumn {
            column: "city".to_string(),
            required_by: "dim_location".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "column 'city' required by dim_location not found in batch"
        );
    }

    #[test]
    fn column_type_display() {
        let err = SchemaError::ColumnType {
            column: "rooms".to_string(),
            expected: ColumnType::Integer,
            found: "f64".to_string(),
        };
        assert_eq!(err.to_string(), "column 'rooms' holds f64 values, expected integer");
    }

    #[test]
    fn sink_error_reports_committed_tables() {
        let err = EtlError::Sink {
            table: "dim_location".to_string(),
            committed: vec![
                "fact_property_purchase".to_string(),
                "dim_property".to_string(),
            ],
            source: SinkError::Rejected {
                table: "dim_location".to_string(),
                message: "disk full".to_string(),
            },
        };
        assert!(err.is_partial_write());
        assert!(
            err.to_string()
                .contains("after committing [fact_property_purchase, dim_property]")
        );
    }

    #[test]
    fn schema_error_converts() {
        let err: EtlError = SchemaError::DuplicateSurrogateKey {
            table: "dim_property".to_string(),
            key: 3,
        }
        .into();
        assert!(matches!(err, EtlError::Schema(_)));
        assert!(!err.is_partial_write());
    }
}
