//! Spreadsheet reading (first sheet only).

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDateTime;
use deid_common::{format_numeric, is_blank, normalize_header};
use deid_model::{Datum, Table};

use crate::error::{IngestError, Result};

/// Read the first sheet of a workbook; its first row holds the column names.
pub fn read_excel_table(path: &Path) -> Result<Table> {
    std::fs::metadata(path).map_err(|e| IngestError::io(path, e))?;

    let workbook_error = |message: String| IngestError::Workbook {
        path: path.to_path_buf(),
        message,
    };
    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?
        .map_err(|e| workbook_error(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| column_name(idx, cell))
        .collect();

    let mut columns: Vec<Vec<Datum>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (idx, column) in columns.iter_mut().enumerate() {
            column.push(row.get(idx).map_or(Datum::Null, datum_from_cell));
        }
    }

    let table = Table::from_columns(names.into_iter().zip(columns).collect()).map_err(|source| {
        IngestError::Table {
            path: path.to_path_buf(),
            source,
        }
    })?;
    tracing::debug!(
        path = %path.display(),
        rows = table.height(),
        columns = table.width(),
        "Read workbook"
    );
    Ok(table)
}

/// Header cell as a column name; blank headers get a positional name.
fn column_name(idx: usize, cell: &Data) -> String {
    let name = match datum_from_cell(cell) {
        Datum::Null => String::new(),
        other => normalize_header(&other.to_string()),
    };
    if name.is_empty() {
        format!("column_{}", idx + 1)
    } else {
        name
    }
}

/// Convert one cell. Whole-number floats become integers, dates become
/// ISO-8601 text, blank strings and error cells become null.
fn datum_from_cell(cell: &Data) -> Datum {
    match cell {
        Data::Empty | Data::Error(_) => Datum::Null,
        Data::Bool(b) => Datum::Bool(*b),
        Data::Int(i) => Datum::Int(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Datum::Int(*f as i64),
        Data::Float(f) => Datum::Float(*f),
        Data::String(s) if is_blank(s) => Datum::Null,
        Data::String(s) => Datum::Str(s.clone()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) => Datum::Str(iso_datetime(value)),
            None => Datum::Str(format_numeric(dt.as_f64())),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Datum::Str(s.clone()),
    }
}

fn iso_datetime(value: NaiveDateTime) -> String {
    if value.time() == chrono::NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}
