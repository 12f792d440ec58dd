//! Text helpers shared by the readers.

/// Cleans a raw header cell into a column name.
///
/// Strips a UTF-8 byte order mark, trims the ends and collapses inner runs of
/// whitespace into single spaces.
///
/// # Examples
///
/// ```
/// use deid_common::normalize_header;
///
/// assert_eq!(normalize_header("\u{feff}PostCode"), "PostCode");
/// assert_eq!(normalize_header("  date   of  birth "), "date of birth");
/// ```
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

/// Returns true when the value is empty or whitespace only.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
