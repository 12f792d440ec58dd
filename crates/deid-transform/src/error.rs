use chrono::NaiveDate;
use deid_model::{DataIoError, TableError};
use thiserror::Error;

/// Why a cell failed a rule's validation.
///
/// Messages never include the cell value itself; the event sink decides
/// whether the value is logged.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Age or date-of-birth cell could not be banded.
    #[error("invalid age datum: {0}")]
    AgeDatum(#[from] AgeDatumError),

    /// Value does not follow the UK postcode grammar.
    #[error("value is not a valid UK postcode")]
    PostCodeFormat,

    /// Value is not a 3 character outward code.
    #[error("expected a 3 character outward code, found {len} characters")]
    PostCodeLength { len: usize },

    /// Rule expects string cells.
    #[error("expected a string, found {found}")]
    NotAString { found: &'static str },
}

/// Reasons an age band cannot be derived.
#[derive(Debug, Error)]
pub enum AgeDatumError {
    #[error("age must not be negative")]
    Negative,

    #[error("age must be a finite number")]
    NotFinite,

    #[error("unsupported cell type {0}")]
    UnsupportedType(&'static str),

    #[error("date of birth is not an ISO-8601 date: {0}")]
    Unparseable(#[from] chrono::ParseError),

    #[error("date of birth is after the reference date {reference}")]
    FutureDate { reference: NaiveDate },
}

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(DataIoError),

    #[error(transparent)]
    Save(DataIoError),

    /// A rule hit a structural table error, usually a missing column.
    #[error("rule '{rule}' failed: {source}")]
    Rule {
        rule: String,
        #[source]
        source: TableError,
    },
}
