//! Wiring jobs to file sources, JSON sinks and rule chains.

use std::path::PathBuf;
use std::sync::Arc;

use deid_ingest::FileSource;
use deid_output::{JsonFileSink, JsonOptions};
use deid_transform::{DataManager, EventSink, PipelineError, PipelineReport};

use crate::jobs::{Job, JobDefaults, JobManifest};

/// Outcome of one job, kept even when the pipeline aborted.
#[derive(Debug)]
pub struct JobRun {
    pub request_id: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub outcome: Result<PipelineReport, PipelineError>,
}

impl JobRun {
    /// True when the pipeline completed and no rule recorded a failure.
    pub fn succeeded(&self) -> bool {
        self.outcome
            .as_ref()
            .is_ok_and(|report| report.status.is_success())
    }
}

/// Build the pipeline for `job`; every rule reports to `events`.
pub fn build_manager(job: &Job, defaults: &JobDefaults, events: &Arc<dyn EventSink>) -> DataManager {
    let source = FileSource::new(&job.input).with_format(job.format);
    let sink = JsonFileSink::new(&job.output)
        .with_options(JsonOptions::with_indent(job.indent(defaults)));
    let mut manager = DataManager::new(Box::new(source), Box::new(sink), job.request_id.clone())
        .with_event_sink(Arc::clone(events));
    manager.set_rules(
        job.rules
            .iter()
            .map(|spec| spec.build(Arc::clone(events)))
            .collect(),
    );
    manager
}

pub fn run_job(job: &Job, defaults: &JobDefaults, events: &Arc<dyn EventSink>) -> JobRun {
    let mut manager = build_manager(job, defaults, events);
    let outcome = manager.run();
    if let Err(error) = &outcome {
        tracing::error!(request_id = %job.request_id, %error, "Pipeline aborted");
    }
    JobRun {
        request_id: job.request_id.clone(),
        input: job.input.clone(),
        output: job.output.clone(),
        outcome,
    }
}

/// Run every job in manifest order. A job that aborts does not stop the rest.
pub fn run_jobs(manifest: &JobManifest, events: &Arc<dyn EventSink>) -> Vec<JobRun> {
    manifest
        .jobs
        .iter()
        .map(|job| run_job(job, &manifest.defaults, events))
        .collect()
}
