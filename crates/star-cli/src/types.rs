use std::path::PathBuf;

use star_model::BatchReport;

/// Outcome of one `run` invocation.
#[derive(Debug)]
pub struct RunResult {
    pub output_dir: PathBuf,
    pub batches: Vec<BatchOutcome>,
    /// Batches never attempted because an earlier batch failed.
    pub skipped: Vec<String>,
}

impl RunResult {
    pub fn has_errors(&self) -> bool {
        self.batches
            .iter()
            .any(|outcome| matches!(outcome, BatchOutcome::Failed { .. }))
    }

    pub fn completed(&self) -> impl Iterator<Item = &BatchReport> {
        self.batches.iter().filter_map(|outcome| match outcome {
            BatchOutcome::Completed(report) => Some(report),
            BatchOutcome::Failed { .. } => None,
        })
    }
}

#[derive(Debug)]
pub enum BatchOutcome {
    Completed(BatchReport),
    Failed {
        batch_id: String,
        error: String,
        /// Tables written before the failure.
        committed: Vec<String>,
    },
}

impl BatchOutcome {
    pub fn batch_id(&self) -> &str {
        match self {
            Self::Completed(report) => &report.batch_id,
            Self::Failed { batch_id, .. } => batch_id,
        }
    }
}

/// Row count of one table found in an output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInventory {
    pub table: String,
    pub rows: Option<usize>,
}
