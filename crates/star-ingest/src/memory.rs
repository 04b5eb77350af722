use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use star_model::{RecordSource, SourceError};

/// Batches held in memory, keyed by batch identifier.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    batches: BTreeMap<String, DataFrame>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_batch(mut self, batch_id: impl Into<String>, frame: DataFrame) -> Self {
        self.insert(batch_id, frame);
        self
    }

    pub fn insert(&mut self, batch_id: impl Into<String>, frame: DataFrame) {
        self.batches.insert(batch_id.into(), frame);
    }

    /// Batch identifiers in name order.
    pub fn batch_ids(&self) -> Vec<String> {
        self.batches.keys().cloned().collect()
    }
}

impl RecordSource for MemorySource {
    fn read_batch(&self, batch_id: &str) -> Result<DataFrame, SourceError> {
        self.batches
            .get(batch_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                batch_id: batch_id.to_string(),
            })
    }
}
