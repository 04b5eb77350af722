//! Column projection and schema checks.

use polars::prelude::DataFrame;
use star_model::{Result, SchemaError, StarModel};

/// Fail with [`SchemaError::MissingColumn`] for the first absent column.
pub fn require_columns<S: AsRef<str>>(
    frame: &DataFrame,
    columns: &[S],
    required_by: &str,
) -> std::result::Result<(), SchemaError> {
    for column in columns {
        let column = column.as_ref();
        if frame.column(column).is_err() {
            return Err(SchemaError::MissingColumn {
                column: column.to_string(),
                required_by: required_by.to_string(),
            });
        }
    }
    Ok(())
}

/// Check that a projected batch carries every column the model reads.
pub fn validate_schema(
    frame: &DataFrame,
    model: &StarModel,
) -> std::result::Result<(), SchemaError> {
    require_columns(frame, &model.fact.columns, &model.fact.table)?;
    for dimension in &model.dimensions {
        require_columns(frame, &dimension.columns, &dimension.table)?;
    }
    Ok(())
}

/// Return `frame` without the `exclude` columns.
///
/// Every excluded column must exist; a batch without it does not have the
/// expected raw shape.
pub fn project_columns(frame: &DataFrame, exclude: &[String]) -> Result<DataFrame> {
    require_columns(frame, exclude, "column projection")?;
    let mut projected = frame.clone();
    for column in exclude {
        projected = projected.drop(column)?;
    }
    Ok(projected)
}

/// Cast every model column of `frame` to its declared type.
///
/// Only lossless conversions are made. A column whose type cannot widen to
/// the declared one (decimals in an integer column, numbers in a text
/// column) fails with [`SchemaError::ColumnType`].
pub fn conform_types(frame: &DataFrame, model: &StarModel) -> Result<DataFrame> {
    let mut conformed = frame.clone();
    for (name, column_type) in &model.column_types {
        let Ok(column) = frame.column(name) else {
            continue;
        };
        let target = column_type.data_type();
        if column.dtype() == &target {
            continue;
        }
        if !column_type.accepts(column.dtype()) {
            return Err(SchemaError::ColumnType {
                column: name.clone(),
                expected: *column_type,
                found: column.dtype().to_string(),
            }
            .into());
        }
        conformed.with_column(column.cast(&target)?)?;
    }
    Ok(conformed)
}
