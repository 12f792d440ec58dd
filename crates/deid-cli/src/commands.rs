use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::Table;
use deid_cli::jobs::{Job, JobDefaults, load_manifest};
use deid_cli::pipeline::{JobRun, run_job, run_jobs};
use deid_transform::{EventSink, RuleKind};
use tracing::info_span;

use crate::cli::ApplyArgs;
use crate::summary::apply_table_style;

pub fn run_manifest(path: &Path, events: &Arc<dyn EventSink>) -> Result<Vec<JobRun>> {
    let manifest =
        load_manifest(path).with_context(|| format!("load manifest {}", path.display()))?;
    let span = info_span!("manifest", path = %path.display(), jobs = manifest.jobs.len());
    let _guard = span.enter();
    Ok(run_jobs(&manifest, events))
}

pub fn run_apply(args: &ApplyArgs, events: &Arc<dyn EventSink>) -> JobRun {
    let job = Job {
        request_id: args.request_id.clone(),
        input: args.input.clone(),
        output: args.output.clone(),
        format: args.format,
        indent: Some(args.indent),
        rules: args.rules.clone(),
    };
    run_job(&job, &JobDefaults::default(), events)
}

pub fn run_rules() {
    let mut table = Table::new();
    table.set_header(vec!["Rule", "Description"]);
    apply_table_style(&mut table);
    for kind in RuleKind::ALL {
        table.add_row(vec![kind.name(), kind.description()]);
    }
    println!("{table}");
}
