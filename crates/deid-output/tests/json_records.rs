//! Snapshot tests for the JSON records writer.

use deid_model::{Datum, Table, TableSink};
use deid_output::{JsonFileSink, JsonOptions, write_records_json};

fn banded() -> Table {
    Table::from_columns(vec![
        ("name", vec![Datum::from("Ann"), Datum::from("Bob")]),
        ("age", vec![Datum::from("20 - 30"), Datum::from("-23")]),
        ("PostCode", vec![Datum::from("OX1"), Datum::Null]),
    ])
    .unwrap()
}

fn render(table: &Table, options: JsonOptions) -> String {
    let mut buf = Vec::new();
    write_records_json(table, &mut buf, options).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn writes_records_with_four_space_indent() {
    insta::assert_snapshot!(render(&banded(), JsonOptions::default()), @r#"
    [
        {
            "name": "Ann",
            "age": "20 - 30",
            "PostCode": "OX1"
        },
        {
            "name": "Bob",
            "age": "-23",
            "PostCode": null
        }
    ]
    "#);
}

#[test]
fn writes_records_with_custom_indent() {
    let table = Table::from_columns(vec![("age", vec![Datum::Int(23)])]).unwrap();
    insta::assert_snapshot!(render(&table, JsonOptions::with_indent(2)), @r#"
    [
      {
        "age": 23
      }
    ]
    "#);
}

#[test]
fn file_sink_writes_and_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("customerOutput.json");
    let sink = JsonFileSink::new(&path);

    sink.save(&banded()).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed[0]["age"], "20 - 30");
    assert_eq!(parsed[1]["PostCode"], serde_json::Value::Null);
    assert!(written.ends_with("]\n"));
}

#[test]
fn file_sink_reports_unwritable_path() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "x").unwrap();
    let sink = JsonFileSink::new(blocker.join("out.json"));

    let err = sink.save(&banded()).unwrap_err();

    assert!(err.to_string().starts_with("failed to save "));
}
