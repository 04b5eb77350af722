use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{error, info, info_span, warn};

use star_core::{PipelineOptions, StarPipeline};
use star_ingest::{CsvSource, list_csv_files};
use star_model::{EtlConfig, EtlError, OutputFormat, StarModel};
use star_output::{FileSink, ReadError, read_table};

use crate::cli::{InspectArgs, RunArgs};
use crate::summary::{inventory_table, model_table};
use crate::types::{BatchOutcome, RunResult, TableInventory};

/// Merge the optional config file with command-line overrides.
pub fn resolve_config(args: &RunArgs) -> Result<EtlConfig> {
    let mut config = match &args.config {
        Some(path) => EtlConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => EtlConfig::default(),
    };
    if let Some(input_dir) = &args.input_dir {
        config.input_dir.clone_from(input_dir);
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir.clone_from(output_dir);
    }
    if !args.files.is_empty() {
        config.files.clone_from(&args.files);
    }
    if let Some(format) = args.format {
        config.output_format = format.into();
    }
    if args.sequential {
        config.parallel_dimensions = false;
    }
    if args.keep_going {
        config.continue_on_error = true;
    }
    Ok(config)
}

pub fn run(args: &RunArgs) -> Result<RunResult> {
    let config = resolve_config(args)?;
    run_batches(&config)
}

/// Process every configured batch in order.
///
/// A failed batch is recorded in the result; without `continue_on_error`
/// the remaining batches are reported as skipped.
pub fn run_batches(config: &EtlConfig) -> Result<RunResult> {
    let run_span = info_span!("run", input_dir = %config.input_dir.display());
    let _run_guard = run_span.enter();

    let batch_ids = if config.files.is_empty() {
        list_csv_files(&config.input_dir).context("list input batches")?
    } else {
        config.files.clone()
    };
    if batch_ids.is_empty() {
        warn!("no CSV batches found");
    }

    let model = StarModel::property_purchase().with_dropped_columns(config.dropped_columns.clone());
    let pipeline = StarPipeline::new(model).with_options(PipelineOptions {
        parallel_dimensions: config.parallel_dimensions,
        ..PipelineOptions::default()
    });
    let source = CsvSource::new(&config.input_dir);
    let mut sink = FileSink::new(&config.output_dir, config.output_format);

    let start = Instant::now();
    let mut batches = Vec::with_capacity(batch_ids.len());
    let mut skipped = Vec::new();
    for (index, batch_id) in batch_ids.iter().enumerate() {
        match pipeline.run_batch(&source, batch_id, &mut sink) {
            Ok(report) => batches.push(BatchOutcome::Completed(report)),
            Err(err) => {
                error!(batch_id = %batch_id, error = %err, "batch failed");
                let committed = match &err {
                    EtlError::Sink { committed, .. } => committed.clone(),
                    _ => Vec::new(),
                };
                batches.push(BatchOutcome::Failed {
                    batch_id: batch_id.clone(),
                    error: err.to_string(),
                    committed,
                });
                if !config.continue_on_error {
                    skipped.extend(batch_ids[index + 1..].iter().cloned());
                    break;
                }
            }
        }
    }

    info!(
        batches = batches.len(),
        skipped = skipped.len(),
        duration_ms = start.elapsed().as_millis(),
        "run finished"
    );
    Ok(RunResult {
        output_dir: config.output_dir.clone(),
        batches,
        skipped,
    })
}

pub fn run_model() -> Result<()> {
    let config = EtlConfig::default();
    let model = StarModel::property_purchase().with_dropped_columns(config.dropped_columns);
    println!("{}", model_table(&model));
    println!("Dropped columns: {}", model.dropped_columns.join(", "));
    Ok(())
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| EtlConfig::default().output_dir);
    let inventory = inspect_tables(&output_dir, args.format.into())?;
    println!("Output: {}", output_dir.display());
    println!("{}", inventory_table(&inventory));
    Ok(())
}

/// Row count of every table of the property-purchase model.
///
/// Tables that were never written are listed without a count.
pub fn inspect_tables(output_dir: &Path, format: OutputFormat) -> Result<Vec<TableInventory>> {
    let model = StarModel::property_purchase();
    let mut inventory = Vec::new();
    for table in model.output_tables() {
        let rows = match read_table(output_dir, table.name(), format) {
            Ok(frame) => Some(frame.height()),
            Err(ReadError::NotFound { .. }) => None,
            Err(err) => return Err(err).with_context(|| format!("read {}", table.name())),
        };
        inventory.push(TableInventory {
            table: table.name().to_string(),
            rows,
        });
    }
    Ok(inventory)
}
