//! Load a table once, run an ordered rule chain over it, save the result.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use deid_model::{Table, TableSink, TableSource};
use tracing::info_span;

use crate::error::PipelineError;
use crate::events::{EventSink, TracingSink};
use crate::report::{PipelineReport, RuleOutcome, RunStatus};
use crate::rule::Rule;

/// Owns one pipeline: a source, a sink, a request id and its rules.
///
/// The table is loaded on first use and cached for the manager's lifetime.
pub struct DataManager {
    source: Box<dyn TableSource>,
    sink: Box<dyn TableSink>,
    request_id: String,
    table: Option<Table>,
    rules: Vec<Box<dyn Rule>>,
    events: Arc<dyn EventSink>,
}

impl DataManager {
    pub fn new(
        source: Box<dyn TableSource>,
        sink: Box<dyn TableSink>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            source,
            sink,
            request_id: request_id.into(),
            table: None,
            rules: Vec::new(),
            events: Arc::new(TracingSink::default()),
        }
    }

    /// Report pipeline events to `events`, together with every rule already set.
    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        for rule in &mut self.rules {
            rule.set_event_sink(Arc::clone(&events));
        }
        self.events = events;
        self
    }

    pub fn events(&self) -> Arc<dyn EventSink> {
        Arc::clone(&self.events)
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Replace the rule chain. Rules run in the given order.
    pub fn set_rules(&mut self, rules: Vec<Box<dyn Rule>>) {
        self.rules = rules;
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// The source table, loading it on first call.
    pub fn ensure_loaded(&mut self) -> Result<&Table, PipelineError> {
        let table = match self.table.take() {
            Some(table) => table,
            None => {
                tracing::debug!(source = %self.source.location(), "Loading table");
                self.source.load().map_err(PipelineError::Load)?
            }
        };
        Ok(self.table.insert(table))
    }

    /// Write `table` to the sink.
    pub fn save(&self, table: &Table) -> Result<(), PipelineError> {
        self.sink.save(table).map_err(PipelineError::Save)
    }

    /// True when any rule has recorded a validation failure.
    pub fn has_error(&self) -> bool {
        self.rules.iter().any(|rule| rule.has_error())
    }

    /// Run every rule on a copy of the loaded table and save the result.
    ///
    /// Validation failures never abort the run; they only turn the status to
    /// [`RunStatus::Fail`]. Load, save and structural table errors do abort.
    pub fn run(&mut self) -> Result<PipelineReport, PipelineError> {
        let span = info_span!("pipeline", request_id = %self.request_id);
        let _guard = span.enter();
        let started = Instant::now();

        let descriptions: Vec<String> = self.rules.iter().map(|rule| rule.description()).collect();
        self.events.pipeline_started(&self.request_id, &descriptions);

        let mut table = self.ensure_loaded()?.clone();
        let rows = table.height();
        for rule in &mut self.rules {
            table = rule.apply_rule(table).map_err(|source| PipelineError::Rule {
                rule: rule.name().to_string(),
                source,
            })?;
            tracing::debug!(
                rule = rule.name(),
                failures = rule.failures(),
                "Rule applied"
            );
        }

        self.save(&table)?;

        let status = if self.has_error() {
            RunStatus::Fail
        } else {
            RunStatus::Success
        };
        let duration = started.elapsed();
        self.events
            .pipeline_finished(&self.request_id, status, duration);

        Ok(PipelineReport {
            request_id: self.request_id.clone(),
            source: self.source.location(),
            destination: self.sink.location(),
            rows,
            rules: self
                .rules
                .iter()
                .map(|rule| RuleOutcome {
                    rule: rule.name().to_string(),
                    fields: rule.fields().to_vec(),
                    error: rule.has_error(),
                    failures: rule.failures(),
                })
                .collect(),
            status,
            duration,
        })
    }
}

impl fmt::Debug for DataManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataManager")
            .field("source", &self.source.location())
            .field("sink", &self.sink.location())
            .field("request_id", &self.request_id)
            .field("loaded", &self.table.is_some())
            .field("rules", &self.rules.len())
            .finish()
    }
}
