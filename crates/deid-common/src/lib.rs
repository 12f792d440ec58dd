//! Shared utilities for deid crates.
//!
//! This crate provides common helpers used across the workspace,
//! including Polars value formatting and header cleanup.

pub mod polars;
pub mod text;

// Re-export commonly used functions at crate root for convenience
pub use polars::{any_to_string, format_numeric};
pub use text::{is_blank, normalize_header};
