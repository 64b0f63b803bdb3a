use anyhow::{Context, Result};
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use etl_common::column_values;
use etl_transform::TableState;

use etl_cli::types::{LoadResult, LoadStatus, TransformResult};

pub fn print_load_summary(result: &LoadResult, show_failures: usize) {
    println!("Input: {} ({} rows)", result.input.display(), result.source_rows);
    match &result.database {
        Some(path) => println!("Database: {}", path.display()),
        None => println!("Database: - (dry run)"),
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Records"),
        header_cell("Failures"),
        header_cell("Warnings"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    let mut total_warnings = 0usize;
    for summary in &result.entities {
        total_warnings += summary.warnings;
        table.add_row(vec![
            Cell::new(&summary.entity)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(summary.records),
            count_cell(summary.failures.len(), Color::Red),
            count_cell(summary.warnings, Color::Yellow),
            status_cell(&summary.status),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.total_records()).add_attribute(Attribute::Bold),
        count_cell(result.total_failures(), Color::Red).add_attribute(Attribute::Bold),
        count_cell(total_warnings, Color::Yellow).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    println!("{table}");
    print_failure_table(result, show_failures);

    let errors: Vec<(&str, &str)> = result
        .entities
        .iter()
        .filter_map(|summary| match &summary.status {
            LoadStatus::Failed(message) | LoadStatus::Unknown(message) => {
                Some((summary.entity.as_str(), message.as_str()))
            }
            LoadStatus::Loaded(_) | LoadStatus::Validated => None,
        })
        .collect();
    if !errors.is_empty() {
        eprintln!("Errors:");
        for (entity, message) in errors {
            eprintln!("- {entity}: {message}");
        }
    }
}

fn print_failure_table(result: &LoadResult, limit: usize) {
    let failures: Vec<(&str, &etl_model::CoercionFailure)> = result
        .entities
        .iter()
        .flat_map(|summary| {
            summary
                .failures
                .iter()
                .map(move |failure| (summary.entity.as_str(), failure))
        })
        .collect();
    if failures.is_empty() || limit == 0 {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Entity"),
        header_cell("Row"),
        header_cell("Field"),
        header_cell("Value"),
        header_cell("Reason"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (entity, failure) in failures.iter().take(limit) {
        table.add_row(vec![
            Cell::new(entity),
            Cell::new(failure.row),
            Cell::new(&failure.field),
            Cell::new(failure.value.to_string()),
            Cell::new(&failure.reason),
        ]);
    }
    println!();
    println!("Coercion failures:");
    println!("{table}");
    if failures.len() > limit {
        println!("... and {} more", failures.len() - limit);
    }
}

pub fn print_transform_summary(result: &TransformResult) {
    println!(
        "Pipeline: {} ({} rows in, stages: {})",
        result.pipeline,
        result.input_rows,
        if result.stages.is_empty() {
            "-".to_string()
        } else {
            result.stages.join(" -> ")
        }
    );
    if let Some(path) = &result.output {
        println!("Output: {}", path.display());
    }
}

/// Print the first `rows` rows of the table.
pub fn print_preview(state: &TableState, rows: usize) -> Result<()> {
    let names = state.column_names();
    let columns = names
        .iter()
        .map(|name| column_values(&state.data, name))
        .collect::<Result<Vec<_>, _>>()
        .context("read frame columns")?;
    let mut table = Table::new();
    table.set_header(names.iter().map(|name| header_cell(name)).collect::<Vec<_>>());
    apply_table_style(&mut table);
    for row in 0..state.height().min(rows) {
        table.add_row(
            columns
                .iter()
                .map(|values| match &values[row] {
                    value if value.is_null() => dim_cell("null"),
                    value => Cell::new(value.to_string()),
                })
                .collect::<Vec<_>>(),
        );
    }
    println!("{}: {} rows x {} columns", state.name, state.height(), state.width());
    println!("{table}");
    if state.height() > rows {
        println!("... {} more rows", state.height() - rows);
    }
    Ok(())
}

pub fn apply_table_style(table: &mut Table) {
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
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: &LoadStatus) -> Cell {
    match status {
        LoadStatus::Loaded(rows) => Cell::new(format!("loaded {rows}")).fg(Color::Green),
        LoadStatus::Validated => Cell::new("validated").fg(Color::Cyan),
        LoadStatus::Failed(_) => Cell::new("FAILED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        LoadStatus::Unknown(_) => Cell::new("UNKNOWN")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
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
