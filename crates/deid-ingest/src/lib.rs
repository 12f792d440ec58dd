//! Data ingestion for deid pipelines.
//!
//! Reads tabular files into [`deid_model::Table`]s:
//!
//! - **CSV** via Polars, schema inferred from the first 100 rows
//! - **JSON** arrays of flat objects, keys in first-seen order
//! - **Spreadsheets** (Cargo feature `excel`): first sheet of `.xlsx`, `.xlsm`,
//!   `.xlsb`, `.xls`, `.ods`
//!
//! [`FileSource`] plugs a file into a pipeline as a `TableSource`.

mod csv;
mod error;
#[cfg(feature = "excel")]
mod excel;
mod format;
mod json;
mod source;

pub use csv::read_csv_table;
pub use error::{IngestError, Result};
#[cfg(feature = "excel")]
pub use excel::read_excel_table;
pub use format::InputFormat;
pub use json::{read_json_table, table_from_json};
pub use source::{FileSource, read_table};
