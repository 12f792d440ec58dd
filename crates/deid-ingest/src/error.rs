//! Error types for data ingestion.

use std::path::PathBuf;

use deid_model::TableError;
use thiserror::Error;

/// Errors that can occur while reading an input file.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("input file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension does not name a supported format.
    #[error("unsupported input format for {path}")]
    UnsupportedFormat { path: PathBuf },

    // === Parsing Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// File is not valid JSON.
    #[error("failed to parse JSON {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON is valid but not an array of objects.
    #[error("expected a JSON array of objects in {path}, found {found}")]
    NotARecordArray { path: PathBuf, found: &'static str },

    /// Spreadsheet could not be opened or read.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// Spreadsheet has no sheet to read.
    #[error("workbook has no sheets: {path}")]
    EmptyWorkbook { path: PathBuf },

    // === Table Errors ===
    /// Parsed cells do not form a valid table.
    #[error("invalid table in {path}: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: TableError,
    },
}

impl IngestError {
    /// Map an I/O error on `path`, distinguishing a missing file.
    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
