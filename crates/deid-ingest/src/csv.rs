//! CSV file reading.

use std::path::Path;

use deid_common::normalize_header;
use deid_model::Table;
use polars::prelude::{CsvReadOptions, SerReader};

use crate::error::{IngestError, Result};

/// Read a comma-delimited file whose first row holds the column names.
///
/// Header names are cleaned the same way as spreadsheet headers.
pub fn read_csv_table(path: &Path) -> Result<Table> {
    std::fs::metadata(path).map_err(|e| IngestError::io(path, e))?;

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .enumerate()
        .map(|(idx, name)| match normalize_header(name.as_str()) {
            clean if clean.is_empty() => format!("column_{}", idx + 1),
            clean => clean,
        })
        .collect();
    df.set_column_names(names)
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Read CSV"
    );
    Ok(Table::from_frame(df))
}
