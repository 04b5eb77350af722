//! Typed natural-key values.
//!
//! Dedup and join both compare rows through [`NaturalKey`], so the two
//! operations agree on equality by construction. Null is an ordinary value:
//! two nulls in the same column are equal.

use polars::prelude::{AnyValue, DataFrame, PolarsResult};

/// One cell of a natural key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    /// Canonical bit pattern: `-0.0` folds into `0.0` and every NaN is one value.
    Float(u64),
    Text(String),
    /// Any other dtype, compared by its rendered form.
    Other(String),
}

impl KeyValue {
    pub fn float(value: f64) -> Self {
        let canonical = if value.is_nan() {
            f64::NAN
        } else if value == 0.0 {
            0.0
        } else {
            value
        };
        Self::Float(canonical.to_bits())
    }
}

impl From<AnyValue<'_>> for KeyValue {
    fn from(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Self::Null,
            AnyValue::Boolean(v) => Self::Bool(v),
            AnyValue::Int8(v) => Self::Int(i64::from(v)),
            AnyValue::Int16(v) => Self::Int(i64::from(v)),
            AnyValue::Int32(v) => Self::Int(i64::from(v)),
            AnyValue::Int64(v) => Self::Int(v),
            AnyValue::UInt8(v) => Self::UInt(u64::from(v)),
            AnyValue::UInt16(v) => Self::UInt(u64::from(v)),
            AnyValue::UInt32(v) => Self::UInt(u64::from(v)),
            AnyValue::UInt64(v) => Self::UInt(v),
            AnyValue::Float32(v) => Self::float(f64::from(v)),
            AnyValue::Float64(v) => Self::float(v),
            AnyValue::String(s) => Self::Text(s.to_string()),
            AnyValue::StringOwned(s) => Self::Text(s.to_string()),
            other => Self::Other(other.to_string()),
        }
    }
}

/// The values of a dimension's natural-key columns for one row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NaturalKey(Vec<KeyValue>);

impl NaturalKey {
    pub fn new(values: Vec<KeyValue>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[KeyValue] {
        &self.0
    }
}

/// Read the natural key of every row, in row order.
///
/// Fails if any of `columns` is absent from `frame`.
pub fn natural_keys(frame: &DataFrame, columns: &[String]) -> PolarsResult<Vec<NaturalKey>> {
    let columns = columns
        .iter()
        .map(|name| frame.column(name))
        .collect::<PolarsResult<Vec<_>>>()?;
    let mut keys = Vec::with_capacity(frame.height());
    for idx in 0..frame.height() {
        let mut values = Vec::with_capacity(columns.len());
        for column in &columns {
            values.push(KeyValue::from(column.get(idx)?));
        }
        keys.push(NaturalKey(values));
    }
    Ok(keys)
}
