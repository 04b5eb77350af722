//! CSV batches read with polars.
//!
//! Each batch is one CSV file in the input directory with a header row.
//! Column types are inferred from the whole file by default, so a decimal
//! deep into an otherwise whole-number column still yields a float column.

use std::path::{Path, PathBuf};

use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use star_model::{RecordSource, SourceError};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CsvSource {
    input_dir: PathBuf,
    infer_schema_rows: Option<usize>,
}

impl CsvSource {
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            infer_schema_rows: None,
        }
    }

    /// Rows scanned for type inference; `None` (the default) scans the
    /// whole file.
    #[must_use]
    pub fn with_infer_schema_rows(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_rows = rows;
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn batch_path(&self, batch_id: &str) -> PathBuf {
        self.input_dir.join(batch_id)
    }
}

impl RecordSource for CsvSource {
    fn read_batch(&self, batch_id: &str) -> Result<DataFrame, SourceError> {
        let path = self.batch_path(batch_id);
        if !path.is_file() {
            return Err(SourceError::FileNotFound { path });
        }
        let read_error = |source| SourceError::Read {
            batch_id: batch_id.to_string(),
            source,
        };
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_rows)
            .try_into_reader_with_file_path(Some(path.clone()))
            .map_err(read_error)?
            .finish()
            .map_err(read_error)?;
        debug!(
            batch_id,
            path = %path.display(),
            rows = frame.height(),
            columns = frame.width(),
            "batch read"
        );
        Ok(frame)
    }
}
