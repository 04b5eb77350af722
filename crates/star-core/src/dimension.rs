//! Dimension extraction.
//!
//! A dimension table is the distinct set of natural-key combinations found in
//! a batch, each tagged with a surrogate key. The natural-key to surrogate-key
//! index is built once during extraction and reused by every fact lookup.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use polars::prelude::{AnyValue, BooleanChunked, DataFrame, NamedFrom, NewChunkedArray, Series};
use star_model::{DimensionDef, EtlError, Result, SchemaError};
use tracing::debug;

use crate::keys::KeyAllocator;
use crate::natural_key::{NaturalKey, natural_keys};
use crate::projection::require_columns;

/// Distinct natural-key rows of one dimension plus their surrogate keys.
#[derive(Debug, Clone)]
pub struct DimensionTable {
    def: DimensionDef,
    frame: DataFrame,
    index: HashMap<NaturalKey, i64>,
}

impl DimensionTable {
    /// Rebuild a dimension table from an existing frame.
    ///
    /// The frame must carry the natural-key columns and the key column, with
    /// no repeated natural key and no repeated or null surrogate key.
    pub fn from_frame(def: DimensionDef, frame: DataFrame) -> Result<Self> {
        require_columns(&frame, &def.output_columns(), &def.table)?;
        let keys = natural_keys(&frame, &def.columns)?;
        let key_column = frame.column(&def.key_column)?;
        let mut index = HashMap::with_capacity(keys.len());
        let mut seen_keys = HashSet::with_capacity(keys.len());
        for (row, natural) in keys.into_iter().enumerate() {
            let surrogate = surrogate_value(key_column.get(row)?).ok_or_else(|| {
                SchemaError::InvalidSurrogateKey {
                    table: def.table.clone(),
                    row,
                }
            })?;
            if !seen_keys.insert(surrogate) {
                return Err(SchemaError::DuplicateSurrogateKey {
                    table: def.table.clone(),
                    key: surrogate,
                }
                .into());
            }
            if index.insert(natural, surrogate).is_some() {
                return Err(SchemaError::DuplicateNaturalKey {
                    table: def.table.clone(),
                    row,
                }
                .into());
            }
        }
        let frame = frame.select(def.output_columns().iter().map(String::as_str))?;
        Ok(Self { def, frame, index })
    }

    pub fn def(&self) -> &DimensionDef {
        &self.def
    }

    pub fn table_name(&self) -> &str {
        &self.def.table
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn frame_mut(&mut self) -> &mut DataFrame {
        &mut self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Surrogate key of the row whose natural key equals `key`, if any.
    pub fn key_for(&self, key: &NaturalKey) -> Option<i64> {
        self.index.get(key).copied()
    }
}

fn surrogate_value(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Int8(v) => Some(i64::from(v)),
        AnyValue::Int16(v) => Some(i64::from(v)),
        AnyValue::Int32(v) => Some(i64::from(v)),
        AnyValue::Int64(v) => Some(v),
        AnyValue::UInt8(v) => Some(i64::from(v)),
        AnyValue::UInt16(v) => Some(i64::from(v)),
        AnyValue::UInt32(v) => Some(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).ok(),
        _ => None,
    }
}

/// Project `batch` onto the dimension's columns, drop duplicate rows, and key
/// each distinct row with the next value from `allocator`.
///
/// Rows keep the order of their first occurrence in the batch. An empty batch
/// yields an empty table.
pub fn extract_dimension<A: KeyAllocator + ?Sized>(
    batch: &DataFrame,
    def: &DimensionDef,
    allocator: &mut A,
) -> Result<DimensionTable> {
    require_columns(batch, &def.columns, &def.table)?;
    let projected = batch.select(def.columns.iter().map(String::as_str))?;
    let keys = natural_keys(&projected, &def.columns)?;

    let mut index = HashMap::with_capacity(keys.len());
    let mut keep = Vec::with_capacity(keys.len());
    let mut surrogates = Vec::new();
    for key in keys {
        match index.entry(key) {
            Entry::Occupied(_) => keep.push(false),
            Entry::Vacant(slot) => {
                let surrogate = allocator.allocate().ok_or_else(|| EtlError::KeysExhausted {
                    table: def.table.clone(),
                })?;
                slot.insert(surrogate);
                surrogates.push(surrogate);
                keep.push(true);
            }
        }
    }

    let mask = BooleanChunked::from_slice("distinct".into(), &keep);
    let mut frame = projected.filter(&mask)?;
    frame.with_column(Series::new(def.key_column.as_str().into(), surrogates))?;
    debug!(
        dimension = %def.table,
        input_rows = batch.height(),
        distinct_rows = frame.height(),
        "dimension extracted"
    );
    Ok(DimensionTable {
        def: def.clone(),
        frame,
        index,
    })
}

/// Extract every dimension of a batch.
///
/// `new_allocator` is called once per definition, in order. With `parallel`
/// set each dimension is extracted on its own scoped thread; the call returns
/// only after all of them finished. Tables come back in definition order.
pub fn extract_dimensions<A, F>(
    batch: &DataFrame,
    defs: &[DimensionDef],
    new_allocator: F,
    parallel: bool,
) -> Result<Vec<DimensionTable>>
where
    A: KeyAllocator + Send,
    F: FnMut(&DimensionDef) -> A,
{
    let allocators: Vec<A> = defs.iter().map(new_allocator).collect();
    if !parallel {
        return defs
            .iter()
            .zip(allocators)
            .map(|(def, mut allocator)| extract_dimension(batch, def, &mut allocator))
            .collect();
    }

    std::thread::scope(|scope| {
        let handles: Vec<_> = defs
            .iter()
            .zip(allocators)
            .map(|(def, mut allocator)| {
                let handle = scope.spawn(move || extract_dimension(batch, def, &mut allocator));
                (def, handle)
            })
            .collect();
        handles
            .into_iter()
            .map(|(def, handle)| match handle.join() {
                Ok(result) => result,
                Err(_) => Err(EtlError::WorkerPanicked {
                    table: def.table.clone(),
                }),
            })
            .collect()
    })
}
