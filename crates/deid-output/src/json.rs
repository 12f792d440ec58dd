//! JSON records writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use deid_model::{DataIoError, Datum, Table, TableSink};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::ser::PrettyFormatter;

use crate::error::{OutputError, Result};

/// Spaces per indentation level when none is configured.
pub const DEFAULT_INDENT: usize = 4;

/// JSON writer settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    /// Spaces per level; `0` writes compact JSON on one line.
    pub indent: usize,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
        }
    }
}

impl JsonOptions {
    pub fn with_indent(indent: usize) -> Self {
        Self { indent }
    }
}

/// Rows serialized as objects keyed by column name.
struct Records<'a> {
    names: &'a [String],
    rows: &'a [Vec<Datum>],
}

struct Record<'a> {
    names: &'a [String],
    values: &'a [Datum],
}

impl Serialize for Records<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for values in self.rows {
            seq.serialize_element(&Record {
                names: self.names,
                values,
            })?;
        }
        seq.end()
    }
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.names.len()))?;
        for (name, value) in self.names.iter().zip(self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Write `table` to `writer` as a JSON array of records.
///
/// Non-finite floats are written as `null`.
pub fn write_records_json<W: Write>(table: &Table, writer: W, options: JsonOptions) -> Result<()> {
    let names = table.column_names();
    let rows = table.records()?;
    let records = Records {
        names: &names,
        rows: &rows,
    };
    if options.indent == 0 {
        serde_json::to_writer(writer, &records)?;
    } else {
        let indent = " ".repeat(options.indent);
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
        records.serialize(&mut serializer)?;
    }
    Ok(())
}

/// Writes tables to a JSON file, replacing any existing content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFileSink {
    path: PathBuf,
    options: JsonOptions,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: JsonOptions::default(),
        }
    }

    pub fn with_options(mut self, options: JsonOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `table`, creating missing parent directories.
    pub fn write(&self, table: &Table) -> Result<()> {
        let io_error = |source| OutputError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let file = File::create(&self.path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        write_records_json(table, &mut writer, self.options)?;
        writer.write_all(b"\n").map_err(io_error)?;
        writer.flush().map_err(io_error)?;
        tracing::info!(
            path = %self.path.display(),
            rows = table.height(),
            "Wrote JSON records"
        );
        Ok(())
    }
}

impl TableSink for JsonFileSink {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn save(&self, table: &Table) -> std::result::Result<(), DataIoError> {
        self.write(table)
            .map_err(|err| DataIoError::save(self.location(), err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(table: &Table, options: JsonOptions) -> String {
        let mut buf = Vec::new();
        write_records_json(table, &mut buf, options).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_compact_output_keeps_column_order() {
        let table = Table::from_columns(vec![
            ("z", vec![Datum::Int(1)]),
            ("a", vec![Datum::from("OX1")]),
        ])
        .unwrap();
        assert_eq!(
            render(&table, JsonOptions::with_indent(0)),
            r#"[{"z":1,"a":"OX1"}]"#
        );
    }

    #[test]
    fn test_nan_and_null_written_as_null() {
        let table = Table::from_columns(vec![(
            "x",
            vec![Datum::Float(f64::NAN), Datum::Null, Datum::Float(1.5)],
        )])
        .unwrap();
        assert_eq!(
            render(&table, JsonOptions::with_indent(0)),
            r#"[{"x":null},{"x":null},{"x":1.5}]"#
        );
    }

    #[test]
    fn test_empty_table_is_empty_array() {
        assert_eq!(render(&Table::default(), JsonOptions::default()), "[]");
    }

    #[test]
    fn test_default_indent_is_four() {
        assert_eq!(JsonOptions::default().indent, 4);
    }
}
