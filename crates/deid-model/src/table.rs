//! In-memory table used by every pipeline stage.
//!
//! [`Table`] wraps a Polars `DataFrame`. Every operation returns a new table
//! and leaves the receiver untouched; Polars columns are reference counted and
//! copy-on-write, so cloning a table is cheap and never aliases later edits.

use std::collections::{HashMap, HashSet};
use std::fmt;

use polars::prelude::{Column, DataFrame, DataType, IntoColumn, NamedFrom, Series};

use crate::datum::Datum;
use crate::error::{Result, TableError};

/// Rows × named columns, all columns the same length.
#[derive(Debug, Clone, Default)]
pub struct Table {
    frame: DataFrame,
}

impl Table {
    /// Build a table from named columns of cells.
    ///
    /// Fails with [`TableError::DuplicateColumn`] on a repeated name and with
    /// [`TableError::LengthMismatch`] when columns differ in length.
    pub fn from_columns<N>(columns: Vec<(N, Vec<Datum>)>) -> Result<Self>
    where
        N: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut expected = None;
        let mut built = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            let name = name.into();
            if !seen.insert(name.clone()) {
                return Err(TableError::DuplicateColumn { column: name });
            }
            let expected = *expected.get_or_insert(values.len());
            if values.len() != expected {
                return Err(TableError::LengthMismatch {
                    column: name,
                    expected,
                    found: values.len(),
                });
            }
            built.push(build_column(&name, values, &DataType::String));
        }
        Ok(Self {
            frame: DataFrame::new(built)?,
        })
    }

    pub fn from_frame(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    /// Read a column's cells in row order.
    pub fn get_column(&self, name: &str) -> Result<Vec<Datum>> {
        let column = self.column(name)?;
        let mut values = Vec::with_capacity(self.height());
        for idx in 0..self.height() {
            values.push(Datum::from(column.get(idx)?));
        }
        Ok(values)
    }

    /// Return a copy with `f` applied to every cell of column `name`.
    pub fn map_column<F>(&self, name: &str, mut f: F) -> Result<Self>
    where
        F: FnMut(Datum) -> Datum,
    {
        let values = self.get_column(name)?.into_iter().map(&mut f).collect();
        self.replace_column(name, values)
    }

    /// Count occurrences of each distinct value in column `name`.
    pub fn group_count(&self, name: &str) -> Result<HashMap<Datum, usize>> {
        let mut counts = HashMap::new();
        for value in self.get_column(name)? {
            *counts.entry(value).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// For each row, how many rows of column `name` hold the same value.
    pub fn row_counts(&self, name: &str) -> Result<Vec<usize>> {
        let counts = self.group_count(name)?;
        Ok(self
            .get_column(name)?
            .iter()
            .map(|value| counts.get(value).copied().unwrap_or(0))
            .collect())
    }

    /// Return a copy with an extra column appended.
    pub fn with_aux_column(&self, name: &str, values: Vec<Datum>) -> Result<Self> {
        if self.has_column(name) {
            return Err(TableError::DuplicateColumn {
                column: name.to_string(),
            });
        }
        self.check_length(name, values.len())?;
        let mut frame = self.frame.clone();
        frame.with_column(build_column(name, values, &DataType::Null))?;
        Ok(Self { frame })
    }

    /// Return a copy with column `name` replaced by `values`, keeping its position.
    pub fn replace_column(&self, name: &str, values: Vec<Datum>) -> Result<Self> {
        let dtype = self.column(name)?.dtype().clone();
        self.check_length(name, values.len())?;
        let mut frame = self.frame.clone();
        frame.with_column(build_column(name, values, &dtype))?;
        Ok(Self { frame })
    }

    /// Return a copy without column `name`.
    pub fn drop_column(&self, name: &str) -> Result<Self> {
        self.column(name)?;
        Ok(Self {
            frame: self.frame.drop(name)?,
        })
    }

    /// Row-major cells, columns in [`Table::column_names`] order.
    pub fn records(&self) -> Result<Vec<Vec<Datum>>> {
        let mut rows: Vec<Vec<Datum>> = (0..self.height())
            .map(|_| Vec::with_capacity(self.width()))
            .collect();
        for name in self.column_names() {
            for (row, value) in rows.iter_mut().zip(self.get_column(&name)?) {
                row.push(value);
            }
        }
        Ok(rows)
    }

    fn column(&self, name: &str) -> Result<&Column> {
        self.frame
            .column(name)
            .map_err(|_| TableError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    fn check_length(&self, name: &str, found: usize) -> Result<()> {
        if found == self.height() || self.width() == 0 {
            Ok(())
        } else {
            Err(TableError::LengthMismatch {
                column: name.to_string(),
                expected: self.height(),
                found,
            })
        }
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.frame.equals_missing(&other.frame)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.frame)
    }
}

/// Storage type chosen for a rebuilt column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    AllNull,
    Bool,
    Int,
    Float,
    Str,
}

/// Any string coerces the column to strings; booleans mixed with numbers do too.
fn column_kind(values: &[Datum]) -> ColumnKind {
    let (mut bools, mut ints, mut floats, mut strings) = (false, false, false, false);
    for value in values {
        match value {
            Datum::Null => {}
            Datum::Bool(_) => bools = true,
            Datum::Int(_) => ints = true,
            Datum::Float(_) => floats = true,
            Datum::Str(_) => strings = true,
        }
    }
    if strings || (bools && (ints || floats)) {
        ColumnKind::Str
    } else if floats {
        ColumnKind::Float
    } else if ints {
        ColumnKind::Int
    } else if bools {
        ColumnKind::Bool
    } else {
        ColumnKind::AllNull
    }
}

/// Build a typed Polars column from cells; an all-null column keeps `fallback`.
fn build_column(name: &str, values: Vec<Datum>, fallback: &DataType) -> Column {
    let series = match column_kind(&values) {
        ColumnKind::Str => {
            let cells: Vec<Option<String>> = values
                .into_iter()
                .map(|value| match value {
                    Datum::Null => None,
                    Datum::Str(s) => Some(s),
                    other => Some(other.to_string()),
                })
                .collect();
            Series::new(name.into(), cells)
        }
        ColumnKind::Float => {
            let cells: Vec<Option<f64>> = values.iter().map(Datum::as_f64).collect();
            Series::new(name.into(), cells)
        }
        ColumnKind::Int => {
            let cells: Vec<Option<i64>> = values.iter().map(Datum::as_i64).collect();
            Series::new(name.into(), cells)
        }
        ColumnKind::Bool => {
            let cells: Vec<Option<bool>> = values
                .iter()
                .map(|value| match value {
                    Datum::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), cells)
        }
        ColumnKind::AllNull => Series::full_null(name.into(), values.len(), fallback),
    };
    series.into_column()
}
