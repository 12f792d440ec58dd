//! The rule contract shared by every field-level transformation.

use std::fmt;
use std::sync::Arc;

use deid_model::{Datum, Table, TableError};

use crate::error::ValidationError;
use crate::events::{EventSink, TracingSink, ValidationFailure};

/// Bookkeeping every rule embeds: target fields, sticky error flag and the
/// sink failures are reported to.
pub struct RuleCore {
    fields: Vec<String>,
    error: bool,
    failures: usize,
    events: Arc<dyn EventSink>,
}

impl RuleCore {
    /// Target `fields` in the given order; repeated names keep their first position.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if !unique.contains(&field) {
                unique.push(field);
            }
        }
        Self {
            fields: unique,
            error: false,
            failures: 0,
            events: Arc::new(TracingSink::default()),
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// True once any cell failed validation. Never resets.
    pub fn has_error(&self) -> bool {
        self.error
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn set_event_sink(&mut self, events: Arc<dyn EventSink>) {
        self.events = events;
    }

    /// Report a failed cell and raise the error flag.
    pub fn record_failure(
        &mut self,
        rule: &str,
        field: &str,
        datum: &Datum,
        error: &ValidationError,
    ) {
        self.events.validation_failed(&ValidationFailure {
            rule,
            field,
            datum,
            error,
        });
        self.error = true;
        self.failures += 1;
    }
}

impl fmt::Debug for RuleCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleCore")
            .field("fields", &self.fields)
            .field("error", &self.error)
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

/// A column-level validate-then-transform policy.
///
/// Implementors provide the per-cell pieces; [`Rule::apply_rule`] walks the
/// target columns. A cell that fails validation is reported through
/// [`Rule::on_validation_error`] and kept, so bad rows never abort a run.
pub trait Rule: Send {
    /// Stable identifier, as used in job manifests.
    fn name(&self) -> &'static str;

    /// One-line summary for listings and logs.
    fn description(&self) -> String {
        format!("{}({})", self.name(), self.core().fields().join(", "))
    }

    fn core(&self) -> &RuleCore;

    fn core_mut(&mut self) -> &mut RuleCore;

    fn validate_datum(&self, value: &Datum) -> Result<(), ValidationError>;

    /// Map a cell already known to be valid.
    fn transform_datum(&self, value: Datum) -> Datum;

    /// How a cell that failed validation is kept.
    fn preserve_datum(&self, value: Datum) -> Datum {
        value
    }

    fn on_validation_error(&mut self, field: &str, value: &Datum, error: &ValidationError) {
        let rule = self.name();
        self.core_mut().record_failure(rule, field, value, error);
    }

    fn validate_then_transform(&mut self, field: &str, value: Datum) -> Datum {
        match self.validate_datum(&value) {
            Ok(()) => self.transform_datum(value),
            Err(err) => {
                self.on_validation_error(field, &value, &err);
                self.preserve_datum(value)
            }
        }
    }

    /// Apply the rule to every target column of `table`.
    ///
    /// A zero-row table is returned as is, without looking up any column.
    fn apply_rule(&mut self, table: Table) -> Result<Table, TableError> {
        if table.is_empty() {
            return Ok(table);
        }
        let fields = self.core().fields().to_vec();
        let mut table = table;
        for field in &fields {
            tracing::debug!(rule = self.name(), field = %field, "Applying rule");
            table = table.map_column(field, |value| self.validate_then_transform(field, value))?;
        }
        Ok(table)
    }

    fn fields(&self) -> &[String] {
        self.core().fields()
    }

    fn has_error(&self) -> bool {
        self.core().has_error()
    }

    fn failures(&self) -> usize {
        self.core().failures()
    }

    fn set_event_sink(&mut self, events: Arc<dyn EventSink>) {
        self.core_mut().set_event_sink(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;

    /// Uppercases strings, rejects everything else.
    struct Upper {
        core: RuleCore,
    }

    impl Rule for Upper {
        fn name(&self) -> &'static str {
            "upper"
        }

        fn core(&self) -> &RuleCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut RuleCore {
            &mut self.core
        }

        fn validate_datum(&self, value: &Datum) -> Result<(), ValidationError> {
            match value {
                Datum::Str(_) => Ok(()),
                other => Err(ValidationError::NotAString {
                    found: other.type_name(),
                }),
            }
        }

        fn transform_datum(&self, value: Datum) -> Datum {
            match value {
                Datum::Str(s) => Datum::Str(s.to_uppercase()),
                other => other,
            }
        }
    }

    fn table() -> Table {
        Table::from_columns(vec![
            ("a", vec![Datum::from("x"), Datum::Null]),
            ("b", vec![Datum::from("y"), Datum::from("z")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_fields_are_deduplicated_in_order() {
        let core = RuleCore::new(["b", "a", "b"]);
        assert_eq!(core.fields(), ["b", "a"]);
    }

    #[test]
    fn test_default_apply_rule() {
        let sink = Arc::new(MemorySink::new());
        let mut rule = Upper {
            core: RuleCore::new(["a", "b"]),
        };
        rule.set_event_sink(sink.clone());

        let out = rule.apply_rule(table()).unwrap();

        assert_eq!(
            out.get_column("a").unwrap(),
            vec![Datum::from("X"), Datum::Null]
        );
        assert_eq!(
            out.get_column("b").unwrap(),
            vec![Datum::from("Y"), Datum::from("Z")]
        );
        assert!(rule.has_error());
        assert_eq!(rule.failures(), 1);
        assert_eq!(sink.failures().len(), 1);
    }

    #[test]
    fn test_empty_fields_returns_equal_table() {
        let mut rule = Upper {
            core: RuleCore::new(Vec::<String>::new()),
        };
        assert_eq!(rule.apply_rule(table()).unwrap(), table());
        assert!(!rule.has_error());
    }

    #[test]
    fn test_zero_rows_skips_column_lookup() {
        let mut rule = Upper {
            core: RuleCore::new(["missing"]),
        };
        let empty = Table::from_columns(vec![("a", vec![])]).unwrap();
        assert_eq!(rule.apply_rule(empty.clone()).unwrap(), empty);
    }

    #[test]
    fn test_missing_column_propagates() {
        let mut rule = Upper {
            core: RuleCore::new(["missing"]),
        };
        assert!(matches!(
            rule.apply_rule(table()),
            Err(TableError::ColumnNotFound { .. })
        ));
    }
}
