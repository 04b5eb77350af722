//! Data-quality reporting for fact assembly.

use serde::{Deserialize, Serialize};

/// Fact rows whose natural key matched no row of one dimension.
///
/// The affected rows carry a null key for that dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResolutionGap {
    pub dimension: String,
    pub key_column: String,
    pub unresolved_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub gaps: Vec<JoinResolutionGap>,
}

impl DataQualityReport {
    pub fn record_gap(&mut self, dimension: &str, key_column: &str, unresolved_rows: usize) {
        if unresolved_rows == 0 {
            return;
        }
        self.gaps.push(JoinResolutionGap {
            dimension: dimension.to_string(),
            key_column: key_column.to_string(),
            unresolved_rows,
        });
    }

    pub fn is_clean(&self) -> bool {
        self.gaps.is_empty()
    }

    /// Unresolved references summed over all dimensions.
    pub fn unresolved_total(&self) -> usize {
        self.gaps.iter().map(|gap| gap.unresolved_rows).sum()
    }

    pub fn unresolved_for(&self, dimension: &str) -> usize {
        self.gaps
            .iter()
            .filter(|gap| gap.dimension == dimension)
            .map(|gap| gap.unresolved_rows)
            .sum()
    }
}
