//! Ten-year age banding from ages or dates of birth.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use deid_model::Datum;

use crate::error::{AgeDatumError, ValidationError};
use crate::rule::{Rule, RuleCore};

/// Highest band floor; every age at or above it is `"90+"`.
const TOP_BAND: i64 = 90;

/// Cell accepted by [`AgeBandRule`], decided once per cell.
#[derive(Debug, Clone, PartialEq)]
pub enum AgeInput {
    Age(i64),
    AgeFloat(f64),
    DateOfBirth(String),
}

impl TryFrom<&Datum> for AgeInput {
    type Error = AgeDatumError;

    fn try_from(value: &Datum) -> Result<Self, Self::Error> {
        match value {
            Datum::Int(age) => Ok(Self::Age(*age)),
            Datum::Float(age) => Ok(Self::AgeFloat(*age)),
            Datum::Str(dob) => Ok(Self::DateOfBirth(dob.clone())),
            other => Err(AgeDatumError::UnsupportedType(other.type_name())),
        }
    }
}

/// Label for a whole age: `"20 - 30"` style, `"90+"` from 90 up.
pub fn band_label(age: i64) -> String {
    let floor = ((age / 10) * 10).min(TOP_BAND);
    if floor == TOP_BAND {
        "90+".to_string()
    } else {
        format!("{floor} - {}", floor + 10)
    }
}

/// Replaces ages or ISO-8601 dates of birth with ten-year band labels.
#[derive(Debug)]
pub struct AgeBandRule {
    core: RuleCore,
    reference_date: NaiveDate,
}

impl AgeBandRule {
    pub const NAME: &'static str = "age_band";

    /// Band against today's local date.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            core: RuleCore::new(fields),
            reference_date: Local::now().date_naive(),
        }
    }

    /// Compute ages from dates of birth as of `date` instead of today.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Whole years of age represented by `input`.
    fn age_of(&self, input: &AgeInput) -> Result<i64, AgeDatumError> {
        match input {
            AgeInput::Age(age) if *age < 0 => Err(AgeDatumError::Negative),
            AgeInput::Age(age) => Ok(*age),
            AgeInput::AgeFloat(age) if !age.is_finite() => Err(AgeDatumError::NotFinite),
            AgeInput::AgeFloat(age) if *age < 0.0 => Err(AgeDatumError::Negative),
            AgeInput::AgeFloat(age) => Ok(age.floor() as i64),
            AgeInput::DateOfBirth(dob) => {
                let dob = parse_date_of_birth(dob)?;
                self.reference_date
                    .years_since(dob)
                    .map(i64::from)
                    .ok_or(AgeDatumError::FutureDate {
                        reference: self.reference_date,
                    })
            }
        }
    }

    fn band(&self, value: &Datum) -> Result<String, AgeDatumError> {
        let input = AgeInput::try_from(value)?;
        self.age_of(&input).map(band_label)
    }
}

/// Accepts `YYYY-MM-DD` or a date-time whose date part is used.
fn parse_date_of_birth(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d").or_else(|err| {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.date_naive())
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
            .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").map(|dt| dt.date()))
            .map_err(|_| err)
    })
}

impl Rule for AgeBandRule {
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
        self.band(value).map(|_| ()).map_err(ValidationError::from)
    }

    fn transform_datum(&self, value: Datum) -> Datum {
        match self.band(&value) {
            Ok(label) => Datum::Str(label),
            Err(_) => value,
        }
    }

    /// The banded column holds labels, so kept values become strings too.
    fn preserve_datum(&self, value: Datum) -> Datum {
        match value {
            Datum::Null => Datum::Null,
            Datum::Str(s) => Datum::Str(s),
            other => Datum::Str(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use deid_model::Table;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn rule(fields: &[&str]) -> AgeBandRule {
        AgeBandRule::new(fields.iter().copied()).with_reference_date(reference())
    }

    #[test]
    fn test_band_label() {
        assert_eq!(band_label(0), "0 - 10");
        assert_eq!(band_label(9), "0 - 10");
        assert_eq!(band_label(23), "20 - 30");
        assert_eq!(band_label(89), "80 - 90");
        assert_eq!(band_label(90), "90+");
        assert_eq!(band_label(130), "90+");
    }

    #[test]
    fn test_age_input_dispatch() {
        assert_eq!(AgeInput::try_from(&Datum::Int(3)).unwrap(), AgeInput::Age(3));
        assert_eq!(
            AgeInput::try_from(&Datum::from("2000-01-01")).unwrap(),
            AgeInput::DateOfBirth("2000-01-01".to_string())
        );
        assert!(matches!(
            AgeInput::try_from(&Datum::Null),
            Err(AgeDatumError::UnsupportedType("null"))
        ));
    }

    #[test]
    fn test_numeric_ages() {
        let rule = rule(&[]);
        assert_eq!(rule.transform_datum(Datum::Int(23)), Datum::from("20 - 30"));
        assert_eq!(rule.transform_datum(Datum::Float(29.9)), Datum::from("20 - 30"));
        assert!(rule.validate_datum(&Datum::Int(-5)).is_err());
        assert!(rule.validate_datum(&Datum::Float(f64::NAN)).is_err());
        assert!(rule.validate_datum(&Datum::Bool(true)).is_err());
    }

    #[test]
    fn test_date_of_birth() {
        let rule = rule(&[]);
        assert_eq!(rule.transform_datum(Datum::from("2010-10-05")), Datum::from("10 - 20"));
        assert_eq!(rule.transform_datum(Datum::from("2014-06-02")), Datum::from("0 - 10"));
        assert_eq!(rule.transform_datum(Datum::from("2014-06-01")), Datum::from("10 - 20"));
        assert_eq!(
            rule.transform_datum(Datum::from("1930-01-01T08:30:00")),
            Datum::from("90+")
        );
        assert_eq!(
            rule.transform_datum(Datum::from("2000-02-29T00:00:00Z")),
            Datum::from("20 - 30")
        );
    }

    #[test]
    fn test_bad_dates_are_rejected() {
        let rule = rule(&[]);
        let err = rule.validate_datum(&Datum::from("2099-01-01")).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::AgeDatum(AgeDatumError::FutureDate { .. })
        ));
        let err = rule.validate_datum(&Datum::from("05/10/2010")).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::AgeDatum(AgeDatumError::Unparseable(_))
        ));
    }

    #[test]
    fn test_negative_age_is_kept_as_string() {
        let sink = Arc::new(MemorySink::new());
        let mut rule = rule(&["age"]);
        rule.set_event_sink(sink.clone());
        let table = Table::from_columns(vec![(
            "age",
            vec![Datum::Int(23), Datum::Int(-23), Datum::Int(95)],
        )])
        .unwrap();

        let out = rule.apply_rule(table).unwrap();

        assert_eq!(
            out.get_column("age").unwrap(),
            vec![Datum::from("20 - 30"), Datum::from("-23"), Datum::from("90+")]
        );
        assert!(rule.has_error());
        assert_eq!(sink.failures().len(), 1);
    }

    #[test]
    fn test_rejected_floats_keep_their_numeric_text() {
        let rule = rule(&["age"]);
        assert_eq!(rule.preserve_datum(Datum::Float(-5.0)), Datum::from("-5"));
        assert_eq!(rule.preserve_datum(Datum::Float(-5.5)), Datum::from("-5.5"));
        assert_eq!(rule.preserve_datum(Datum::Null), Datum::Null);
    }

    #[test]
    fn test_future_date_kept_unchanged() {
        let mut rule = rule(&["dob"]);
        let table = Table::from_columns(vec![(
            "dob",
            vec![Datum::from("2010-10-05"), Datum::from("2099-01-01")],
        )])
        .unwrap();

        let out = rule.apply_rule(table).unwrap();

        assert_eq!(
            out.get_column("dob").unwrap(),
            vec![Datum::from("10 - 20"), Datum::from("2099-01-01")]
        );
        assert!(rule.has_error());
    }

    #[test]
    fn test_default_reference_date_is_today() {
        let rule = AgeBandRule::new(["dob"]);
        assert_eq!(rule.reference_date(), Local::now().date_naive());
    }

    proptest! {
        #[test]
        fn prop_integer_ages_band(age in 0i64..=120) {
            let expected = if age >= 90 {
                "90+".to_string()
            } else {
                format!("{} - {}", 10 * (age / 10), 10 * (age / 10) + 10)
            };
            let rule = rule(&[]);
            prop_assert!(rule.validate_datum(&Datum::Int(age)).is_ok());
            prop_assert_eq!(rule.transform_datum(Datum::Int(age)), Datum::Str(expected));
        }

        #[test]
        fn prop_negative_ages_fail(age in i64::MIN..0) {
            prop_assert!(rule(&[]).validate_datum(&Datum::Int(age)).is_err());
        }
    }
}
