//! Reduce full UK postcodes to their first three characters.

use deid_model::Datum;

use super::postcode::is_uk_postcode;
use crate::error::ValidationError;
use crate::rule::{Rule, RuleCore};

/// Keeps the first three characters of each valid UK postcode.
///
/// Not idempotent: a three character fragment no longer matches the
/// postcode grammar, so a second pass reports every cell as invalid.
#[derive(Debug)]
pub struct PostCodeTrimToThreeRule {
    core: RuleCore,
}

impl PostCodeTrimToThreeRule {
    pub const NAME: &'static str = "postcode_trim_to_three";

    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            core: RuleCore::new(fields),
        }
    }
}

impl Rule for PostCodeTrimToThreeRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn core(&self) -> &RuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RuleCore {
        &mut self.core
    }

    fn validate_datum(&self, value: &Datum) -> Result<(), ValidationError> {
        match value {
            Datum::Str(postcode) if is_uk_postcode(postcode) => Ok(()),
            _ => Err(ValidationError::PostCodeFormat),
        }
    }

    fn transform_datum(&self, value: Datum) -> Datum {
        match value {
            Datum::Str(postcode) => Datum::Str(postcode.chars().take(3).collect()),
            other => other,
        }
    }
}
