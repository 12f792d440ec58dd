use std::path::PathBuf;

use deid_model::TableError;
use thiserror::Error;

/// Errors raised while writing output.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Output file could not be created or written.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Table cells could not be read.
    #[error(transparent)]
    Table(#[from] TableError),
}

pub type Result<T> = std::result::Result<T, OutputError>;
