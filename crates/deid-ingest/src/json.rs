//! JSON record-array reading.

use std::collections::HashMap;
use std::path::Path;

use deid_model::{Datum, Table};
use serde_json::Value;

use crate::error::{IngestError, Result};

/// Read a JSON array of flat objects.
pub fn read_json_table(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
    let value: Value = serde_json::from_str(&text).map_err(|source| IngestError::JsonParse {
        path: path.to_path_buf(),
        source,
    })?;
    let table = table_from_json(path, value)?;
    tracing::debug!(
        path = %path.display(),
        rows = table.height(),
        columns = table.width(),
        "Read JSON"
    );
    Ok(table)
}

/// Build a table from parsed JSON records.
///
/// Columns follow the order keys are first seen; a record without a key
/// contributes a null. Nested arrays and objects are kept as JSON text.
pub fn table_from_json(path: &Path, value: Value) -> Result<Table> {
    let not_records = |found| IngestError::NotARecordArray {
        path: path.to_path_buf(),
        found,
    };
    let records = match value {
        Value::Array(records) => records,
        other => return Err(not_records(json_type(&other))),
    };

    let mut names: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut columns: Vec<Vec<Datum>> = Vec::new();

    for (row, record) in records.into_iter().enumerate() {
        let fields = match record {
            Value::Object(fields) => fields,
            other => return Err(not_records(json_type(&other))),
        };
        for (key, value) in fields {
            let col = *index.entry(key.clone()).or_insert_with(|| {
                names.push(key);
                columns.push(vec![Datum::Null; row]);
                columns.len() - 1
            });
            columns[col].push(datum_from_json(value));
        }
        for column in &mut columns {
            if column.len() == row {
                column.push(Datum::Null);
            }
        }
    }

    Table::from_columns(names.into_iter().zip(columns).collect()).map_err(|source| {
        IngestError::Table {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn datum_from_json(value: Value) -> Datum {
    match value {
        Value::Null => Datum::Null,
        Value::Bool(b) => Datum::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Datum::Int(i),
            None => n.as_f64().map_or(Datum::Null, Datum::Float),
        },
        Value::String(s) => Datum::Str(s),
        nested @ (Value::Array(_) | Value::Object(_)) => Datum::Str(nested.to_string()),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: Value) -> Result<Table> {
        table_from_json(Path::new("test.json"), value)
    }

    #[test]
    fn test_keys_in_first_seen_order() {
        let table = table(json!([
            {"name": "Ann", "age": 23},
            {"PostCode": "OX15XJ", "name": "Bob"}
        ]))
        .unwrap();

        assert_eq!(table.column_names(), vec!["name", "age", "PostCode"]);
        assert_eq!(
            table.get_column("age").unwrap(),
            vec![Datum::Int(23), Datum::Null]
        );
        assert_eq!(
            table.get_column("PostCode").unwrap(),
            vec![Datum::Null, Datum::from("OX15XJ")]
        );
    }

    #[test]
    fn test_mixed_numbers_and_nested_values() {
        let table = table(json!([
            {"age": 23, "tags": ["a"]},
            {"age": 41.5, "tags": {"k": 1}}
        ]))
        .unwrap();

        assert_eq!(
            table.get_column("age").unwrap(),
            vec![Datum::Float(23.0), Datum::Float(41.5)]
        );
        assert_eq!(
            table.get_column("tags").unwrap(),
            vec![Datum::from(r#"["a"]"#), Datum::from(r#"{"k":1}"#)]
        );
    }

    #[test]
    fn test_rejects_non_record_arrays() {
        assert!(matches!(
            table(json!({"age": 1})),
            Err(IngestError::NotARecordArray { found: "object", .. })
        ));
        assert!(matches!(
            table(json!([1, 2])),
            Err(IngestError::NotARecordArray { found: "number", .. })
        ));
    }

    #[test]
    fn test_empty_array_is_empty_table() {
        let table = table(json!([])).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.width(), 0);
    }
}
