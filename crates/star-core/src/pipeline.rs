//! Batch pipeline with explicit stages.
//!
//! One batch moves through these stages in order, and the next batch starts
//! only after the previous one returned:
//! 1. **Read**: fetch the batch from the record source
//! 2. **Project**: drop columns that never enter the model, check the schema
//! 3. **Extract**: build every dimension table (optionally in parallel)
//! 4. **Assemble**: join the untouched batch against the dimensions
//! 5. **Write**: persist the fact table (append) and dimensions (overwrite)
//!
//! Dimension keys restart with every batch. Fact rows written by an earlier
//! batch keep the keys of that batch's dimensions, which a later overwrite
//! replaces; no key registry carries keys across runs.

use std::time::Instant;

use polars::prelude::DataFrame;
use star_model::{
    BatchReport, DataQualityReport, EtlError, OutputTable, RecordSource, Result, StarModel,
    TableSink, TableWrite,
};
use tracing::{debug, info, info_span, warn};

use crate::dimension::{DimensionTable, extract_dimensions};
use crate::fact::{FactTable, assemble_facts};
use crate::keys::SequentialKeyAllocator;
use crate::projection::{conform_types, project_columns, validate_schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Extract dimensions on scoped threads.
    pub parallel_dimensions: bool,
    /// First surrogate key of every dimension table.
    pub first_key: i64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            parallel_dimensions: true,
            first_key: 0,
        }
    }
}

/// The four tables produced from one batch.
#[derive(Debug, Clone)]
pub struct StarSchema {
    pub input_rows: usize,
    pub fact: FactTable,
    pub dimensions: Vec<DimensionTable>,
}

impl StarSchema {
    pub fn quality(&self) -> &DataQualityReport {
        &self.fact.quality
    }

    pub fn dimension(&self, table: &str) -> Option<&DimensionTable> {
        self.dimensions.iter().find(|dim| dim.table_name() == table)
    }

    /// Frames paired with their output table identity, fact table first.
    fn tables_mut(&mut self) -> Vec<(OutputTable, &mut DataFrame)> {
        let mut tables = vec![(
            OutputTable::Fact(self.fact.table.clone()),
            &mut self.fact.frame,
        )];
        for dimension in &mut self.dimensions {
            let table = OutputTable::Dimension(dimension.table_name().to_string());
            tables.push((table, dimension.frame_mut()));
        }
        tables
    }
}

/// Turns raw batches into star schema tables.
#[derive(Debug, Clone, Default)]
pub struct StarPipeline {
    model: StarModel,
    options: PipelineOptions,
}

impl StarPipeline {
    pub fn new(model: StarModel) -> Self {
        Self {
            model,
            options: PipelineOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &StarModel {
        &self.model
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    // ========================================================================
    // Stage 2: Project
    // ========================================================================

    /// Drop the model's excluded columns, check the remaining schema, and
    /// cast model columns to their declared types.
    ///
    /// Appended fact parts share one schema whatever types the source
    /// inferred for this batch.
    pub fn prepare(&self, batch: &DataFrame) -> Result<DataFrame> {
        let projected = project_columns(batch, &self.model.dropped_columns)?;
        validate_schema(&projected, &self.model)?;
        conform_types(&projected, &self.model)
    }

    // ========================================================================
    // Stages 2-4: Project, Extract, Assemble
    // ========================================================================

    /// Build the star schema for one raw batch without writing anything.
    pub fn transform(&self, batch: &DataFrame) -> Result<StarSchema> {
        let projected = self.prepare(batch)?;
        let first_key = self.options.first_key;
        let dimensions = extract_dimensions(
            &projected,
            &self.model.dimensions,
            |_| SequentialKeyAllocator::starting_at(first_key),
            self.options.parallel_dimensions,
        )?;
        let fact = assemble_facts(&projected, &self.model.fact, &dimensions)?;
        Ok(StarSchema {
            input_rows: projected.height(),
            fact,
            dimensions,
        })
    }

    // ========================================================================
    // Stage 5: Write
    // ========================================================================

    /// Write all tables of `schema`, each with the mode its table kind
    /// dictates.
    ///
    /// Stops at the first failed write. The error names the tables already
    /// written for this batch.
    pub fn write<S: TableSink + ?Sized>(
        &self,
        schema: &mut StarSchema,
        sink: &mut S,
    ) -> Result<Vec<TableWrite>> {
        let mut writes: Vec<TableWrite> = Vec::new();
        for (table, frame) in schema.tables_mut() {
            let mode = table.write_mode();
            let rows = frame.height();
            if let Err(source) = sink.write_table(table.name(), frame, mode) {
                return Err(EtlError::Sink {
                    table: table.name().to_string(),
                    committed: writes.iter().map(|write| write.table.clone()).collect(),
                    source,
                });
            }
            debug!(table = %table.name(), %mode, rows, "table written");
            writes.push(TableWrite {
                table: table.name().to_string(),
                mode,
                rows,
            });
        }
        Ok(writes)
    }

    /// Run every stage for one named batch.
    pub fn run_batch<R, S>(&self, source: &R, batch_id: &str, sink: &mut S) -> Result<BatchReport>
    where
        R: RecordSource + ?Sized,
        S: TableSink + ?Sized,
    {
        let span = info_span!("batch", batch_id = %batch_id);
        let _guard = span.enter();
        info!("Processing {batch_id}...");
        let start = Instant::now();

        let batch = source.read_batch(batch_id)?;
        let mut schema = self.transform(&batch)?;
        if !schema.quality().is_clean() {
            warn!(
                unresolved = schema.quality().unresolved_total(),
                "batch has unresolved dimension references"
            );
        }
        let writes = self.write(&mut schema, sink)?;

        let report = BatchReport {
            batch_id: batch_id.to_string(),
            input_rows: schema.input_rows,
            writes,
            quality: schema.fact.quality,
            duration: start.elapsed(),
        };
        info!(
            rows = report.input_rows,
            duration_ms = report.duration.as_millis(),
            "Finished processing {batch_id} in {:.2} seconds.",
            report.duration_secs_rounded()
        );
        Ok(report)
    }
}
