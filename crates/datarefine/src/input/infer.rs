//! Column type inference over raw literals.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::table::{Cell, ColumnType};

/// Canonical date format for storage and output.
pub(crate) const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepted date input formats, tried in order. The first is canonical.
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Maximum distinct values for a string column to count as categorical.
pub(crate) const CATEGORICAL_THRESHOLD: usize = 20;

// Shape of a number once currency symbols, separators, and whitespace are
// allowed; the actual value check is the parse after stripping.
static DECORATED_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\s$€£¥]*[-+]?[\s$€£¥]*\d[\d,_\s]*(\.\d+)?([eE][-+]?\d+)?$").unwrap()
});

/// Check if a raw literal represents a missing value.
pub fn is_missing_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nil")
        || trimmed == "."
        || trimmed == "-"
}

/// Parse a literal as a plain, undecorated number.
pub(crate) fn plain_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a number after stripping currency symbols, thousands separators,
/// and stray whitespace. Plain numbers pass through unchanged.
pub(crate) fn strip_numeric_decoration(value: &str) -> Option<f64> {
    if let Some(n) = plain_number(value) {
        return Some(n);
    }
    let trimmed = value.trim();
    if !DECORATED_NUMBER.is_match(trimmed) {
        return None;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '¥' | ',' | '_') && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a date literal against an ordered list of accepted formats.
pub(crate) fn parse_date(value: &str, formats: &[String]) -> Option<NaiveDate> {
    let trimmed = value.trim();
    formats
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(trimmed, f).ok())
}

/// Infer a column type from its non-missing literals.
///
/// Numeric wins when every literal is a (possibly decorated) number, date
/// when every literal matches an accepted format; otherwise the column is
/// categorical when its distinct-value count is small, text when not.
pub(crate) fn infer_column_type(
    literals: &[&str],
    date_formats: &[String],
    categorical_threshold: usize,
) -> ColumnType {
    let non_missing: Vec<&str> = literals
        .iter()
        .copied()
        .filter(|v| !is_missing_token(v))
        .collect();

    if non_missing.is_empty() {
        return ColumnType::Text;
    }

    if non_missing
        .iter()
        .all(|v| strip_numeric_decoration(v).is_some())
    {
        return ColumnType::Numeric;
    }

    if non_missing
        .iter()
        .all(|v| parse_date(v, date_formats).is_some())
    {
        return ColumnType::Date;
    }

    let mut distinct: Vec<&str> = non_missing.clone();
    distinct.sort_unstable();
    distinct.dedup();
    if distinct.len() <= categorical_threshold {
        ColumnType::Categorical
    } else {
        ColumnType::Text
    }
}

/// Build a typed cell from a raw literal under a declared column type.
///
/// Only cleanly parsed literals become typed cells; decorated numerics and
/// non-canonical dates stay `Text` for the normalizer to coerce and log.
pub(crate) fn typed_cell(raw: &str, column_type: ColumnType) -> Cell {
    if is_missing_token(raw) {
        return Cell::Missing;
    }
    match column_type {
        ColumnType::Numeric => match plain_number(raw) {
            Some(n) => Cell::Number(n),
            None => Cell::Text(raw.to_string()),
        },
        ColumnType::Date => match NaiveDate::parse_from_str(raw.trim(), CANONICAL_DATE_FORMAT) {
            Ok(d) => Cell::Date(d),
            Err(_) => Cell::Text(raw.to_string()),
        },
        ColumnType::Categorical | ColumnType::Text => Cell::Text(raw.to_string()),
    }
}
