//! Cell values.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single cell value.
///
/// A cell's variant may lag behind its column's declared type: a literal
/// that did not parse cleanly under the declared type is held as `Text`
/// until the normalizer coerces it (e.g. `"$1,200"` in a numeric column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Cell {
    /// A numeric value.
    Number(f64),
    /// A calendar date.
    Date(NaiveDate),
    /// A text value (also used for categorical literals).
    Text(String),
    /// An absent value.
    Missing,
}

impl Cell {
    /// Returns true if this cell is missing.
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Get the numeric value, if this is a number cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the date value, if this is a date cell.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Get the text value, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the cell's variant, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Number(_) => "number",
            Cell::Date(_) => "date",
            Cell::Text(_) => "text",
            Cell::Missing => "missing",
        }
    }

    /// A stable string key that distinguishes variants with equal display
    /// forms (`Text("1")` vs `Number(1.0)`). Used for row comparison.
    pub(crate) fn identity_key(&self) -> String {
        match self {
            Cell::Number(n) => format!("n:{}", n),
            Cell::Date(d) => format!("d:{}", d),
            Cell::Text(s) => format!("t:{}", s),
            Cell::Missing => "m:".to_string(),
        }
    }
}

impl fmt::Display for Cell {
    /// Canonical display form: dates as `YYYY-MM-DD`, missing as empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Missing => Ok(()),
        }
    }
}
