//! Declarative rule descriptions, as written in job manifests and on the
//! command line.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::EventSink;
use crate::rule::Rule;
use crate::rules::{AgeBandRule, PostCodeTrimToThreeRule, PostCodeTrimToTwoRule};

/// Built-in rule kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    AgeBand,
    PostCodeTrimToThree,
    PostCodeTrimToTwo,
}

impl RuleKind {
    pub const ALL: [Self; 3] = [
        Self::AgeBand,
        Self::PostCodeTrimToThree,
        Self::PostCodeTrimToTwo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::AgeBand => AgeBandRule::NAME,
            Self::PostCodeTrimToThree => PostCodeTrimToThreeRule::NAME,
            Self::PostCodeTrimToTwo => PostCodeTrimToTwoRule::NAME,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::AgeBand => {
                "Replace ages or ISO-8601 dates of birth with 10-year bands (\"20 - 30\", \"90+\")"
            }
            Self::PostCodeTrimToThree => {
                "Keep the first 3 characters of valid UK postcodes"
            }
            Self::PostCodeTrimToTwo => {
                "Trim 3-character outward codes to 2 when fewer than min_group_size rows share them"
            }
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RuleKind {
    type Err = RuleSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| RuleSpecError::UnknownRule(s.to_string()))
    }
}

/// Errors parsing a `KIND:FIELD[,FIELD]...` rule argument.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleSpecError {
    #[error("unknown rule '{0}'")]
    UnknownRule(String),

    #[error("rule '{0}' has no fields; expected KIND:FIELD[,FIELD]...")]
    MissingFields(String),
}

/// One configured rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case", deny_unknown_fields)]
pub enum RuleSpec {
    AgeBand {
        fields: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reference_date: Option<NaiveDate>,
    },
    #[serde(rename = "postcode_trim_to_three")]
    PostCodeTrimToThree { fields: Vec<String> },
    #[serde(rename = "postcode_trim_to_two")]
    PostCodeTrimToTwo {
        fields: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_group_size: Option<usize>,
    },
}

impl RuleSpec {
    /// Spec for `kind` with default settings.
    pub fn new(kind: RuleKind, fields: Vec<String>) -> Self {
        match kind {
            RuleKind::AgeBand => Self::AgeBand {
                fields,
                reference_date: None,
            },
            RuleKind::PostCodeTrimToThree => Self::PostCodeTrimToThree { fields },
            RuleKind::PostCodeTrimToTwo => Self::PostCodeTrimToTwo {
                fields,
                min_group_size: None,
            },
        }
    }

    pub fn kind(&self) -> RuleKind {
        match self {
            Self::AgeBand { .. } => RuleKind::AgeBand,
            Self::PostCodeTrimToThree { .. } => RuleKind::PostCodeTrimToThree,
            Self::PostCodeTrimToTwo { .. } => RuleKind::PostCodeTrimToTwo,
        }
    }

    pub fn fields(&self) -> &[String] {
        match self {
            Self::AgeBand { fields, .. }
            | Self::PostCodeTrimToThree { fields }
            | Self::PostCodeTrimToTwo { fields, .. } => fields,
        }
    }

    /// Instantiate the rule, reporting to `events`.
    pub fn build(&self, events: Arc<dyn EventSink>) -> Box<dyn Rule> {
        let mut rule: Box<dyn Rule> = match self {
            Self::AgeBand {
                fields,
                reference_date,
            } => {
                let rule = AgeBandRule::new(fields.iter().cloned());
                Box::new(match reference_date {
                    Some(date) => rule.with_reference_date(*date),
                    None => rule,
                })
            }
            Self::PostCodeTrimToThree { fields } => {
                Box::new(PostCodeTrimToThreeRule::new(fields.iter().cloned()))
            }
            Self::PostCodeTrimToTwo {
                fields,
                min_group_size,
            } => {
                let rule = PostCodeTrimToTwoRule::new(fields.iter().cloned());
                Box::new(match min_group_size {
                    Some(size) => rule.with_min_group_size(*size),
                    None => rule,
                })
            }
        };
        rule.set_event_sink(events);
        rule
    }
}

impl FromStr for RuleSpec {
    type Err = RuleSpecError;

    /// Parse `KIND:FIELD[,FIELD]...`, e.g. `age_band:dob`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, fields) = s
            .split_once(':')
            .ok_or_else(|| RuleSpecError::MissingFields(s.trim().to_string()))?;
        let kind: RuleKind = kind.parse()?;
        let fields: Vec<String> = fields
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(String::from)
            .collect();
        if fields.is_empty() {
            return Err(RuleSpecError::MissingFields(kind.name().to_string()));
        }
        Ok(Self::new(kind, fields))
    }
}
