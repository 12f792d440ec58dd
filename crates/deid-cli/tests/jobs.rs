//! End-to-end tests running manifests against files on disk.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use deid_cli::jobs::load_manifest;
use deid_cli::pipeline::run_jobs;
use deid_transform::{EventSink, MemorySink, PipelineError, RunStatus};
use serde_json::{Value, json};

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn runs_every_job_in_the_manifest() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "customer.csv",
        "name,dob\nAnn,2010-10-05\nBob,1930-01-01\n",
    );
    write(
        dir.path(),
        "customer.json",
        r#"[{"age": 23, "PostCode": "OX15XJ"}, {"age": -23, "PostCode": "NY13TY"}]"#,
    );
    let mut outward = String::from("PostCode\n");
    for _ in 0..12 {
        outward.push_str("OX1\n");
    }
    outward.push_str("NY1\n");
    write(dir.path(), "outward.csv", &outward);
    write(
        dir.path(),
        "jobs.toml",
        r#"
[[job]]
request_id = "123"
input = "customer.csv"
output = "out/customerOutput.json"
rules = [{ rule = "age_band", fields = ["dob"], reference_date = "2024-06-01" }]

[[job]]
request_id = "456"
input = "customer.json"
output = "out/customerOutput2.json"
rules = [
    { rule = "age_band", fields = ["age"] },
    { rule = "postcode_trim_to_three", fields = ["PostCode"] },
]

[[job]]
request_id = "789"
input = "outward.csv"
output = "out/customerOutput3.json"
indent = 0
rules = [{ rule = "postcode_trim_to_two", fields = ["PostCode"] }]
"#,
    );

    let manifest = load_manifest(&dir.path().join("jobs.toml")).unwrap();
    let sink = Arc::new(MemorySink::new());
    let events: Arc<dyn EventSink> = sink.clone();
    let runs = run_jobs(&manifest, &events);

    assert_eq!(runs.len(), 3);
    assert!(runs[0].succeeded());
    assert!(!runs[1].succeeded());
    assert!(runs[2].succeeded());
    assert_eq!(sink.failures().len(), 1);

    let out = dir.path().join("out");
    assert_eq!(
        read_json(&out.join("customerOutput.json")),
        json!([
            {"name": "Ann", "dob": "10 - 20"},
            {"name": "Bob", "dob": "90+"}
        ])
    );
    assert_eq!(
        read_json(&out.join("customerOutput2.json")),
        json!([
            {"age": "20 - 30", "PostCode": "OX1"},
            {"age": "-23", "PostCode": "NY1"}
        ])
    );
    let outward = read_json(&out.join("customerOutput3.json"));
    assert_eq!(outward[0], json!({"PostCode": "OX1"}));
    assert_eq!(outward[12], json!({"PostCode": "NY"}));
    let report = runs[1].outcome.as_ref().unwrap();
    assert_eq!(report.status, RunStatus::Fail);
    assert_eq!(report.rules.len(), 2);
}

#[test]
fn aborted_job_does_not_stop_later_jobs() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.csv", "PostCode\nOX15XJ\n");
    write(
        dir.path(),
        "jobs.toml",
        r#"
[[job]]
request_id = "missing-input"
input = "nope.csv"
output = "a.json"

[[job]]
request_id = "missing-column"
input = "a.csv"
output = "b.json"
rules = [{ rule = "postcode_trim_to_three", fields = ["postcode"] }]

[[job]]
request_id = "ok"
input = "a.csv"
output = "c.json"
rules = [{ rule = "postcode_trim_to_three", fields = ["PostCode"] }]
"#,
    );

    let manifest = load_manifest(&dir.path().join("jobs.toml")).unwrap();
    let events: Arc<dyn EventSink> = Arc::new(MemorySink::new());
    let runs = run_jobs(&manifest, &events);

    assert!(matches!(runs[0].outcome, Err(PipelineError::Load(_))));
    assert!(matches!(runs[1].outcome, Err(PipelineError::Rule { .. })));
    assert!(!dir.path().join("b.json").exists());
    assert!(runs[2].succeeded());
    assert_eq!(
        read_json(&dir.path().join("c.json")),
        json!([{"PostCode": "OX1"}])
    );
}

#[test]
fn written_output_uses_four_space_indent_by_default() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.csv", "PostCode\nOX15XJ\n");
    write(
        dir.path(),
        "jobs.toml",
        r#"
[[job]]
request_id = "1"
input = "a.csv"
output = "a.json"
"#,
    );

    let manifest = load_manifest(&dir.path().join("jobs.toml")).unwrap();
    let events: Arc<dyn EventSink> = Arc::new(MemorySink::new());
    run_jobs(&manifest, &events);

    assert_eq!(
        fs::read_to_string(dir.path().join("a.json")).unwrap(),
        "[\n    {\n        \"PostCode\": \"OX15XJ\"\n    }\n]\n"
    );
}

#[test]
fn manifest_without_jobs_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "jobs.toml", "[defaults]\nindent = 2\n");
    let err = load_manifest(&dir.path().join("jobs.toml")).unwrap_err();
    assert!(err.to_string().contains("defines no [[job]] entries"));
}
