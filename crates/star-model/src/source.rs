use polars::prelude::DataFrame;

use crate::error::SourceError;

/// Supplies one batch of raw records per named batch identifier.
///
/// How records are decoded is up to the implementation; the engine only sees
/// a data frame with named columns.
pub trait RecordSource {
    fn read_batch(&self, batch_id: &str) -> Result<DataFrame, SourceError>;
}
