use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use star_model::{BatchReport, OutputTable, StarModel};

use crate::types::{BatchOutcome, RunResult, TableInventory};

pub fn print_summary(result: &RunResult) {
    println!("Output: {}", result.output_dir.display());
    if result.batches.is_empty() {
        println!("No batches processed.");
        return;
    }
    println!("{}", summary_table(result));
    if !result.skipped.is_empty() {
        println!("Skipped after failure: {}", result.skipped.join(", "));
    }
}

/// Per-batch table: rows read and written, unresolved references, duration.
pub fn summary_table(result: &RunResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Batch"),
        header_cell("Input rows"),
        header_cell("Fact rows"),
        header_cell("Dimension rows"),
        header_cell("Unresolved"),
        header_cell("Seconds"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 6, CellAlignment::Center);

    let mut total_input = 0usize;
    let mut total_facts = 0usize;
    let mut total_unresolved = 0usize;
    for outcome in &result.batches {
        match outcome {
            BatchOutcome::Completed(report) => {
                let facts = fact_rows(report);
                let unresolved = report.quality.unresolved_total();
                total_input += report.input_rows;
                total_facts += facts;
                total_unresolved += unresolved;
                table.add_row(vec![
                    Cell::new(&report.batch_id),
                    Cell::new(report.input_rows),
                    Cell::new(facts),
                    Cell::new(dimension_rows(report)),
                    count_cell(unresolved, Color::Yellow),
                    Cell::new(format!("{:.2}", report.duration_secs_rounded())),
                    Cell::new("ok").fg(Color::Green).add_attribute(Attribute::Bold),
                ]);
            }
            BatchOutcome::Failed {
                batch_id,
                committed,
                ..
            } => {
                let status = if committed.is_empty() {
                    "failed".to_string()
                } else {
                    format!("partial ({})", committed.len())
                };
                table.add_row(vec![
                    Cell::new(batch_id),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    Cell::new(status).fg(Color::Red).add_attribute(Attribute::Bold),
                ]);
            }
        }
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_input).add_attribute(Attribute::Bold),
        Cell::new(total_facts).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(total_unresolved, Color::Yellow).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    table
}

/// Failure messages, one line per failed batch.
pub fn failure_lines(result: &RunResult) -> Vec<String> {
    result
        .batches
        .iter()
        .filter_map(|outcome| match outcome {
            BatchOutcome::Failed {
                batch_id, error, ..
            } => Some(format!("{batch_id}: {error}")),
            BatchOutcome::Completed(_) => None,
        })
        .collect()
}

pub fn model_table(model: &StarModel) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Kind"),
        header_cell("Write mode"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut table);
    for output in model.output_tables() {
        let (kind, columns) = match &output {
            OutputTable::Fact(_) => ("fact", model.fact_columns()),
            OutputTable::Dimension(name) => (
                "dimension",
                model
                    .dimension(name)
                    .map(|def| def.output_columns())
                    .unwrap_or_default(),
            ),
        };
        table.add_row(vec![
            Cell::new(output.name()),
            Cell::new(kind),
            Cell::new(output.write_mode()),
            Cell::new(columns.join(", ")),
        ]);
    }
    table
}

pub fn inventory_table(inventory: &[TableInventory]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Table"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for entry in inventory {
        let rows = match entry.rows {
            Some(rows) => Cell::new(rows),
            None => dim_cell("missing"),
        };
        table.add_row(vec![Cell::new(&entry.table), rows]);
    }
    table
}

fn fact_rows(report: &BatchReport) -> usize {
    report
        .writes
        .iter()
        .find(|write| write.mode == star_model::WriteMode::Append)
        .map_or(0, |write| write.rows)
}

fn dimension_rows(report: &BatchReport) -> usize {
    report
        .writes
        .iter()
        .filter(|write| write.mode == star_model::WriteMode::Overwrite)
        .map(|write| write.rows)
        .sum()
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
