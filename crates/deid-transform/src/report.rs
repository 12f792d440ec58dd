//! Outcome of one pipeline run.

use std::fmt;
use std::time::Duration;

/// Overall status: `Fail` when any rule recorded a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Fail,
}

impl RunStatus {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Fail => f.write_str("fail"),
        }
    }
}

/// Error state of one rule after the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub rule: String,
    pub fields: Vec<String>,
    pub error: bool,
    pub failures: usize,
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub request_id: String,
    pub source: String,
    pub destination: String,
    pub rows: usize,
    pub rules: Vec<RuleOutcome>,
    pub status: RunStatus,
    pub duration: Duration,
}

impl PipelineReport {
    /// Total validation failures across all rules.
    pub fn failures(&self) -> usize {
        self.rules.iter().map(|rule| rule.failures).sum()
    }
}
