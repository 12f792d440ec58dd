use std::sync::LazyLock;

use regex::Regex;

/// UK postcode: outward code (A9, A99, AA9, AA99, A9A, AA9A), optional
/// single space, inward code (9AA). `GIR 0AA` is the one exception.
static UK_POSTCODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:GIR ?0AA|[A-Z]{1,2}[0-9][A-Z0-9]? ?[0-9][A-Z]{2})$")
        .expect("Invalid UK postcode regex")
});

/// Check `value` against the UK postcode grammar, ignoring case.
pub fn is_uk_postcode(value: &str) -> bool {
    UK_POSTCODE_REGEX.is_match(value)
}
