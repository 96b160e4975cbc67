//! Column definition and per-column statistics.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// Declared data type for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Floating-point numbers.
    Numeric,
    /// Discrete string values drawn from a small set.
    Categorical,
    /// Calendar dates.
    Date,
    /// Free text.
    Text,
}

impl ColumnType {
    /// Get a human-readable label for the column type.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "Numeric",
            ColumnType::Categorical => "Categorical",
            ColumnType::Date => "Date",
            ColumnType::Text => "Text",
        }
    }

    /// Returns true if this type holds string values.
    pub fn is_textual(&self) -> bool {
        matches!(self, ColumnType::Categorical | ColumnType::Text)
    }
}

/// A named, typed column of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (header).
    pub name: String,
    /// Declared or inferred type.
    pub column_type: ColumnType,
    /// Cell values, one per row.
    pub cells: Vec<Cell>,
}

impl Column {
    /// Create a column with the given cells.
    pub fn new(name: impl Into<String>, column_type: ColumnType, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            column_type,
            cells,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_missing()).count()
    }

    /// Fraction of cells that are missing (0.0 for an empty column).
    pub fn missing_ratio(&self) -> f64 {
        if self.cells.is_empty() {
            0.0
        } else {
            self.missing_count() as f64 / self.cells.len() as f64
        }
    }

    /// Row indices and values of properly typed numeric cells, in row order.
    pub fn numeric_values(&self) -> Vec<(usize, f64)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_number().map(|n| (i, n)))
            .collect()
    }

    /// Arithmetic mean over typed numeric cells.
    pub fn mean(&self) -> Option<f64> {
        let values = self.numeric_values();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().map(|(_, v)| v).sum::<f64>() / values.len() as f64)
    }

    /// Most frequent non-missing value, by display form. Ties are broken
    /// by first occurrence.
    pub fn mode(&self) -> Option<String> {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for cell in &self.cells {
            if cell.is_missing() {
                continue;
            }
            *counts.entry(cell.to_string()).or_insert(0) += 1;
        }
        first_max(&counts).cloned()
    }

    /// Most frequent date value. Ties are broken by first occurrence.
    pub fn mode_date(&self) -> Option<NaiveDate> {
        let mut counts: IndexMap<NaiveDate, usize> = IndexMap::new();
        for cell in &self.cells {
            if let Some(d) = cell.as_date() {
                *counts.entry(d).or_insert(0) += 1;
            }
        }
        first_max(&counts).copied()
    }
}

/// Key with the highest count; insertion order wins ties.
fn first_max<K>(counts: &IndexMap<K, usize>) -> Option<&K> {
    let mut best: Option<(&K, usize)> = None;
    for (key, &count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((key, count)),
        }
    }
    best.map(|(k, _)| k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_missing_ratio() {
        let col = Column::new(
            "x",
            ColumnType::Numeric,
            vec![Cell::Number(1.0), Cell::Missing, Cell::Number(3.0), Cell::Missing],
        );
        assert_eq!(col.missing_count(), 2);
        assert!((col.missing_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mean_ignores_missing_and_text() {
        let col = Column::new(
            "x",
            ColumnType::Numeric,
            vec![
                Cell::Number(10.0),
                Cell::Missing,
                Cell::Text("$30".into()),
                Cell::Number(20.0),
            ],
        );
        assert_eq!(col.mean(), Some(15.0));
    }

    #[test]
    fn test_mode_ties_break_by_first_occurrence() {
        let col = Column::new(
            "city",
            ColumnType::Categorical,
            vec![text("LA"), text("NY"), text("NY"), text("LA")],
        );
        assert_eq!(col.mode(), Some("LA".to_string()));
    }

    #[test]
    fn test_mode_prefers_most_frequent() {
        let col = Column::new(
            "city",
            ColumnType::Categorical,
            vec![text("NY"), Cell::Missing, text("NY"), text("LA")],
        );
        assert_eq!(col.mode(), Some("NY".to_string()));
    }

    #[test]
    fn test_mode_empty_column() {
        let col = Column::new("city", ColumnType::Categorical, vec![Cell::Missing]);
        assert_eq!(col.mode(), None);
    }
}
