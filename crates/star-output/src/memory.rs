use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use star_model::{SinkError, TableSink, WriteMode};

/// Keeps written tables in memory. Used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    tables: BTreeMap<String, DataFrame>,
    log: Vec<(String, WriteMode)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&DataFrame> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Every write received, in order, with its mode.
    pub fn write_log(&self) -> &[(String, WriteMode)] {
        &self.log
    }
}

impl TableSink for MemorySink {
    fn write_table(
        &mut self,
        table: &str,
        frame: &mut DataFrame,
        mode: WriteMode,
    ) -> Result<(), SinkError> {
        let existing = match mode {
            WriteMode::Append => self.tables.get_mut(table),
            WriteMode::Overwrite => None,
        };
        if let Some(existing) = existing {
            existing
                .vstack_mut(frame)
                .map_err(|error| SinkError::SchemaMismatch {
                    table: table.to_string(),
                    message: error.to_string(),
                })?;
        } else {
            self.tables.insert(table.to_string(), frame.clone());
        }
        self.log.push((table.to_string(), mode));
        Ok(())
    }
}
