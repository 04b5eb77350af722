use polars::prelude::DataFrame;

use crate::error::SinkError;
use crate::star::WriteMode;

/// Persists a named table.
///
/// The write mode is chosen by the engine per table (see
/// [`crate::OutputTable::write_mode`]); implementations must honour it:
/// `Append` adds rows to what the table already holds, `Overwrite` replaces
/// the table entirely.
pub trait TableSink {
    fn write_table(
        &mut self,
        table: &str,
        frame: &mut DataFrame,
        mode: WriteMode,
    ) -> Result<(), SinkError>;
}

impl<T: TableSink + ?Sized> TableSink for &mut T {
    fn write_table(
        &mut self,
        table: &str,
        frame: &mut DataFrame,
        mode: WriteMode,
    ) -> Result<(), SinkError> {
        (**self).write_table(table, frame, mode)
    }
}
