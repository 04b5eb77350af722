use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::quality::DataQualityReport;
use crate::star::WriteMode;

/// One table written for a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableWrite {
    pub table: String,
    pub mode: WriteMode,
    pub rows: usize,
}

/// Outcome of one fully committed batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub input_rows: usize,
    pub writes: Vec<TableWrite>,
    pub quality: DataQualityReport,
    pub duration: Duration,
}

impl BatchReport {
    pub fn rows_written(&self, table: &str) -> Option<usize> {
        self.writes
            .iter()
            .find(|write| write.table == table)
            .map(|write| write.rows)
    }

    /// Processing time in seconds, rounded to two decimals.
    pub fn duration_secs_rounded(&self) -> f64 {
        (self.duration.as_secs_f64() * 100.0).round() / 100.0
    }
}
