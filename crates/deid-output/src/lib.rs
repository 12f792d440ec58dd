//! Output writers for deid tables.
//!
//! Tables are written as a JSON array of row objects ("records"), keys in
//! column order.

mod error;
mod json;

pub use error::{OutputError, Result};
pub use json::{DEFAULT_INDENT, JsonFileSink, JsonOptions, write_records_json};
