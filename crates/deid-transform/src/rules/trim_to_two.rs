//! Generalise rare outward codes to their first two characters.

use deid_model::{Datum, Table, TableError};

use crate::error::ValidationError;
use crate::rule::{Rule, RuleCore};

/// Groups smaller than this are generalised.
pub const DEFAULT_MIN_GROUP_SIZE: usize = 10;

/// Trims three character outward codes to two when fewer than
/// `min_group_size` rows share the value.
#[derive(Debug)]
pub struct PostCodeTrimToTwoRule {
    core: RuleCore,
    min_group_size: usize,
}

impl PostCodeTrimToTwoRule {
    pub const NAME: &'static str = "postcode_trim_to_two";

    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            core: RuleCore::new(fields),
            min_group_size: DEFAULT_MIN_GROUP_SIZE,
        }
    }

    pub fn with_min_group_size(mut self, min_group_size: usize) -> Self {
        self.min_group_size = min_group_size;
        self
    }

    pub fn min_group_size(&self) -> usize {
        self.min_group_size
    }

    /// Name for the staged count column that is not already taken.
    fn count_column(table: &Table, field: &str) -> String {
        let base = format!("__{field}_count");
        let mut name = base.clone();
        let mut suffix = 1;
        while table.has_column(&name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        name
    }

    fn apply_field(&mut self, table: Table, field: &str) -> Result<Table, TableError> {
        let count_column = Self::count_column(&table, field);
        let counts: Vec<Datum> = table
            .row_counts(field)?
            .into_iter()
            .map(|count| Datum::Int(count as i64))
            .collect();
        let staged = table.with_aux_column(&count_column, counts)?;

        let values = staged.get_column(field)?;
        let counts = staged.get_column(&count_column)?;
        let mut out = Vec::with_capacity(values.len());
        for (value, count) in values.into_iter().zip(counts) {
            if let Err(err) = self.validate_datum(&value) {
                self.on_validation_error(field, &value, &err);
                out.push(value);
                continue;
            }
            let rare = count
                .as_i64()
                .is_some_and(|count| (count as usize) < self.min_group_size);
            out.push(if rare {
                self.transform_datum(value)
            } else {
                value
            });
        }

        staged.replace_column(field, out)?.drop_column(&count_column)
    }
}

impl Rule for PostCodeTrimToTwoRule {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> String {
        format!(
            "{}({}; min_group_size={})",
            self.name(),
            self.core.fields().join(", "),
            self.min_group_size
        )
    }

    fn core(&self) -> &RuleCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RuleCore {
        &mut self.core
    }

    fn validate_datum(&self, value: &Datum) -> Result<(), ValidationError> {
        match value {
            Datum::Str(code) => match code.chars().count() {
                3 => Ok(()),
                len => Err(ValidationError::PostCodeLength { len }),
            },
            other => Err(ValidationError::NotAString {
                found: other.type_name(),
            }),
        }
    }

    fn transform_datum(&self, value: Datum) -> Datum {
        match value {
            Datum::Str(code) => Datum::Str(code.chars().take(2).collect()),
            other => other,
        }
    }

    /// Counts are taken over the whole column before any cell changes.
    fn apply_rule(&mut self, table: Table) -> Result<Table, TableError> {
        if table.is_empty() {
            return Ok(table);
        }
        let fields = self.core.fields().to_vec();
        let mut table = table;
        for field in &fields {
            tracing::debug!(rule = Self::NAME, field = %field, "Applying rule");
            table = self.apply_field(table, field)?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(values: Vec<&str>) -> Table {
        Table::from_columns(vec![(
            "PostCode",
            values.into_iter().map(Datum::from).collect(),
        )])
        .unwrap()
    }

    #[test]
    fn test_common_codes_stay_rare_codes_trimmed() {
        let mut values = vec!["OX1"; 20];
        values.push("NY1");
        let mut rule = PostCodeTrimToTwoRule::new(["PostCode"]);

        let out = rule.apply_rule(codes(values)).unwrap();

        let column = out.get_column("PostCode").unwrap();
        assert_eq!(column[..20], vec![Datum::from("OX1"); 20][..]);
        assert_eq!(column[20], Datum::from("NY"));
        assert_eq!(out.column_names(), vec!["PostCode"]);
        assert!(!rule.has_error());
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut rule = PostCodeTrimToTwoRule::new(["PostCode"]).with_min_group_size(2);
        let out = rule
            .apply_rule(codes(vec!["OX1", "OX1", "NY1"]))
            .unwrap();
        assert_eq!(
            out.get_column("PostCode").unwrap(),
            vec![Datum::from("OX1"), Datum::from("OX1"), Datum::from("NY")]
        );
    }

    #[test]
    fn test_wrong_length_is_an_error_even_when_common() {
        let mut values = vec!["OX15"; 12];
        values.push("NY1");
        let mut rule = PostCodeTrimToTwoRule::new(["PostCode"]);

        let out = rule.apply_rule(codes(values)).unwrap();

        let column = out.get_column("PostCode").unwrap();
        assert_eq!(column[0], Datum::from("OX15"));
        assert_eq!(column[12], Datum::from("NY"));
        assert!(rule.has_error());
        assert_eq!(rule.failures(), 12);
    }

    #[test]
    fn test_non_string_is_kept() {
        let table = Table::from_columns(vec![(
            "PostCode",
            vec![Datum::Null, Datum::from("OX1")],
        )])
        .unwrap();
        let mut rule = PostCodeTrimToTwoRule::new(["PostCode"]);

        let out = rule.apply_rule(table).unwrap();

        assert_eq!(
            out.get_column("PostCode").unwrap(),
            vec![Datum::Null, Datum::from("OX")]
        );
        assert!(rule.has_error());
    }

    #[test]
    fn test_existing_count_column_is_left_alone() {
        let table = Table::from_columns(vec![
            ("PostCode", vec![Datum::from("OX1")]),
            ("__PostCode_count", vec![Datum::Int(1)]),
            ("__PostCode_count_1", vec![Datum::Int(2)]),
        ])
        .unwrap();
        let mut rule = PostCodeTrimToTwoRule::new(["PostCode"]);

        let out = rule.apply_rule(table).unwrap();

        assert_eq!(
            out.column_names(),
            vec!["PostCode", "__PostCode_count", "__PostCode_count_1"]
        );
        assert_eq!(out.get_column("PostCode").unwrap(), vec![Datum::from("OX")]);
        assert_eq!(
            out.get_column("__PostCode_count").unwrap(),
            vec![Datum::Int(1)]
        );
        assert_eq!(
            out.get_column("__PostCode_count_1").unwrap(),
            vec![Datum::Int(2)]
        );
        assert!(!rule.has_error());
    }

    #[test]
    fn test_description_mentions_threshold() {
        let rule = PostCodeTrimToTwoRule::new(["PostCode"]).with_min_group_size(5);
        assert_eq!(
            rule.description(),
            "postcode_trim_to_two(PostCode; min_group_size=5)"
        );
    }
}
