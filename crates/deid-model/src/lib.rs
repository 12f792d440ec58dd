//! Tabular data model for deid pipelines.
//!
//! - **datum**: the [`Datum`] cell value
//! - **table**: the [`Table`] container backed by a Polars `DataFrame`
//! - **io**: the [`TableSource`] / [`TableSink`] seams implemented by readers and writers

pub mod datum;
pub mod error;
pub mod io;
pub mod table;

pub use datum::Datum;
pub use error::{DataIoError, Result, TableError};
pub use io::{MemorySource, MemoryTarget, TableSink, TableSource};
pub use table::Table;
