//! Diagnostic events emitted by rules and pipelines.

use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use deid_model::Datum;

use crate::error::ValidationError;
use crate::report::RunStatus;

/// One cell that failed validation.
#[derive(Debug, Clone, Copy)]
pub struct ValidationFailure<'a> {
    pub rule: &'a str,
    pub field: &'a str,
    pub datum: &'a Datum,
    pub error: &'a ValidationError,
}

/// Receiver for pipeline diagnostics.
///
/// Pipelines and rules hold an `Arc<dyn EventSink>`; [`TracingSink`] is used
/// when none is injected.
pub trait EventSink: Send + Sync + fmt::Debug {
    fn pipeline_started(&self, _request_id: &str, _rules: &[String]) {}

    fn validation_failed(&self, failure: &ValidationFailure<'_>);

    fn pipeline_finished(&self, _request_id: &str, _status: RunStatus, _duration: Duration) {}
}

/// Forwards events to `tracing`, hiding cell values unless told otherwise.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    redact: bool,
}

impl TracingSink {
    pub const REDACTED: &'static str = "[REDACTED]";

    pub fn new() -> Self {
        Self { redact: true }
    }

    /// Include raw cell values in failure events.
    pub fn with_data(mut self, include: bool) -> Self {
        self.redact = !include;
        self
    }

    pub fn redacts(&self) -> bool {
        self.redact
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for TracingSink {
    fn pipeline_started(&self, request_id: &str, rules: &[String]) {
        tracing::info!(
            request_id,
            rules = %rules.join(" -> "),
            "Pipeline started"
        );
    }

    fn validation_failed(&self, failure: &ValidationFailure<'_>) {
        let datum = if self.redact {
            Self::REDACTED.to_string()
        } else {
            format!("{:?}", failure.datum)
        };
        tracing::warn!(
            rule = failure.rule,
            field = failure.field,
            datum = %datum,
            error = %failure.error,
            "Validation failed; keeping original value"
        );
    }

    fn pipeline_finished(&self, request_id: &str, status: RunStatus, duration: Duration) {
        tracing::info!(
            request_id,
            %status,
            duration_ms = duration.as_millis() as u64,
            "Pipeline finished"
        );
    }
}

/// Event captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent {
    Started {
        request_id: String,
        rules: Vec<String>,
    },
    Failed {
        rule: String,
        field: String,
        datum: Datum,
        error: String,
    },
    Finished {
        request_id: String,
        status: RunStatus,
    },
}

/// Sink that records every event, for tests and embedding callers.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<RecordedEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Only the validation failures, in the order they were reported.
    pub fn failures(&self) -> Vec<RecordedEvent> {
        self.events()
            .into_iter()
            .filter(|event| matches!(event, RecordedEvent::Failed { .. }))
            .collect()
    }

    fn push(&self, event: RecordedEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl EventSink for MemorySink {
    fn pipeline_started(&self, request_id: &str, rules: &[String]) {
        self.push(RecordedEvent::Started {
            request_id: request_id.to_string(),
            rules: rules.to_vec(),
        });
    }

    fn validation_failed(&self, failure: &ValidationFailure<'_>) {
        self.push(RecordedEvent::Failed {
            rule: failure.rule.to_string(),
            field: failure.field.to_string(),
            datum: failure.datum.clone(),
            error: failure.error.to_string(),
        });
    }

    fn pipeline_finished(&self, request_id: &str, status: RunStatus, _duration: Duration) {
        self.push(RecordedEvent::Finished {
            request_id: request_id.to_string(),
            status,
        });
    }
}
