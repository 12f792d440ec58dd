use std::time::Duration;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use deid_cli::pipeline::JobRun;
use deid_transform::RunStatus;

pub fn print_summary(runs: &[JobRun]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Request"),
        header_cell("Input"),
        header_cell("Rows"),
        header_cell("Rules"),
        header_cell("Failures"),
        header_cell("Status"),
        header_cell("Duration"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);
    align_column(&mut table, 6, CellAlignment::Right);

    let mut total_rows = 0usize;
    let mut total_failures = 0usize;
    let mut errors = Vec::new();
    for run in runs {
        let input = run.input.display().to_string();
        match &run.outcome {
            Ok(report) => {
                total_rows += report.rows;
                total_failures += report.failures();
                table.add_row(vec![
                    Cell::new(&run.request_id),
                    Cell::new(input),
                    Cell::new(report.rows),
                    Cell::new(report.rules.len()),
                    count_cell(report.failures(), Color::Yellow),
                    status_cell(report.status),
                    Cell::new(format_duration(report.duration)),
                ]);
            }
            Err(error) => {
                errors.push(format!("{}: {error}", run.request_id));
                table.add_row(vec![
                    Cell::new(&run.request_id),
                    Cell::new(input),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    Cell::new("ABORTED")
                        .fg(Color::Red)
                        .add_attribute(Attribute::Bold),
                    dim_cell("-"),
                ]);
            }
        }
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} job(s)", runs.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(total_failures, Color::Yellow).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");
    if !errors.is_empty() {
        eprintln!("Errors:");
        for error in &errors {
            eprintln!("- {error}");
        }
    }
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
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
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

fn status_cell(status: RunStatus) -> Cell {
    match status {
        RunStatus::Success => Cell::new("SUCCESS").fg(Color::Green),
        RunStatus::Fail => Cell::new("FAIL")
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(42)), "42ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }
}
