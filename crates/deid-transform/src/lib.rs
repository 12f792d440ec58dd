//! De-identification rules and the pipeline that applies them.
//!
//! A [`Rule`] validates and rewrites the cells of one or more columns; a
//! [`DataManager`] loads a table once, runs its rules in order and saves the
//! result.

pub mod error;
pub mod events;
pub mod manager;
pub mod report;
pub mod rule;
pub mod rules;
pub mod spec;

pub use error::{AgeDatumError, PipelineError, ValidationError};
pub use events::{EventSink, MemorySink, RecordedEvent, TracingSink, ValidationFailure};
pub use manager::DataManager;
pub use report::{PipelineReport, RuleOutcome, RunStatus};
pub use rule::{Rule, RuleCore};
pub use rules::{AgeBandRule, AgeInput, PostCodeTrimToThreeRule, PostCodeTrimToTwoRule};
pub use spec::{RuleKind, RuleSpec};
