use thiserror::Error;

/// Structural errors raised by [`crate::Table`] operations.
#[derive(Debug, Error)]
pub enum TableError {
    /// Column not found in the table.
    #[error("column '{column}' not found in table")]
    ColumnNotFound { column: String },

    /// A column with this name already exists.
    #[error("column '{column}' already exists in table")]
    DuplicateColumn { column: String },

    /// Column length differs from the table row count.
    #[error("column '{column}' has {found} values, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

pub type Result<T> = std::result::Result<T, TableError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors crossing the [`crate::TableSource`] / [`crate::TableSink`] seam.
#[derive(Debug, Error)]
pub enum DataIoError {
    /// Loading the table failed.
    #[error("failed to load {location}: {source}")]
    Load {
        location: String,
        #[source]
        source: BoxError,
    },

    /// Saving the table failed.
    #[error("failed to save {location}: {source}")]
    Save {
        location: String,
        #[source]
        source: BoxError,
    },
}

impl DataIoError {
    pub fn load(location: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Load {
            location: location.into(),
            source: source.into(),
        }
    }

    pub fn save(location: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Save {
            location: location.into(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TableError::ColumnNotFound {
            column: "PostCode".to_string(),
        };
        assert_eq!(err.to_string(), "column 'PostCode' not found in table");
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("age".into());
        let table_err: TableError = polars_err.into();
        assert!(matches!(table_err, TableError::Polars(_)));
    }

    #[test]
    fn test_io_error_keeps_location() {
        let err = DataIoError::load("customer.csv", "bad header");
        assert_eq!(err.to_string(), "failed to load customer.csv: bad header");
    }
}
