//! Fact assembly.
//!
//! Every input record yields exactly one fact row. For each dimension the
//! record's natural key is looked up in that dimension's index; a miss leaves
//! the key null and is counted as a join resolution gap instead of failing.

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use star_model::{DataQualityReport, FactDef, Result};
use tracing::warn;

use crate::dimension::DimensionTable;
use crate::natural_key::natural_keys;
use crate::projection::require_columns;

/// Assembled fact rows plus the data-quality findings of the join.
#[derive(Debug, Clone)]
pub struct FactTable {
    pub table: String,
    pub frame: DataFrame,
    pub quality: DataQualityReport,
}

impl FactTable {
    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
}

/// Resolve one surrogate key per record for a single dimension.
pub fn resolve_keys(batch: &DataFrame, dimension: &DimensionTable) -> Result<Vec<Option<i64>>> {
    let def = dimension.def();
    require_columns(batch, &def.columns, &def.table)?;
    let keys = natural_keys(batch, &def.columns)?;
    Ok(keys.iter().map(|key| dimension.key_for(key)).collect())
}

/// Build the fact table for `batch`, which must be the full, non-deduplicated
/// batch the dimensions were extracted from.
///
/// Output columns are the fact definition's transaction columns followed by
/// one key column per dimension, in the order `dimensions` is given.
pub fn assemble_facts(
    batch: &DataFrame,
    fact: &FactDef,
    dimensions: &[DimensionTable],
) -> Result<FactTable> {
    require_columns(batch, &fact.columns, &fact.table)?;
    let mut columns: Vec<Column> = fact
        .columns
        .iter()
        .map(|name| batch.column(name).cloned())
        .collect::<std::result::Result<_, _>>()?;

    let mut quality = DataQualityReport::default();
    for dimension in dimensions {
        let def = dimension.def();
        let resolved = resolve_keys(batch, dimension)?;
        let unresolved = resolved.iter().filter(|key| key.is_none()).count();
        if unresolved > 0 {
            warn!(
                dimension = %def.table,
                key_column = %def.key_column,
                unresolved,
                "fact rows without a matching dimension row"
            );
        }
        quality.record_gap(&def.table, &def.key_column, unresolved);
        columns.push(Series::new(def.key_column.as_str().into(), resolved).into_column());
    }

    let frame = DataFrame::new(columns)?;
    Ok(FactTable {
        table: fact.table.clone(),
        frame,
        quality,
    })
}
