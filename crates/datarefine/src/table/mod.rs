//! Typed tabular data model.

mod cell;
mod column;

pub use cell::Cell;
pub use column::{Column, ColumnType};

use serde::{Deserialize, Serialize};

use crate::error::{RefineError, Result};

/// An ordered sequence of named columns with a uniform row count.
///
/// The constructor enforces the structural invariants (unique non-empty
/// headers, equal column lengths). Tables deserialized from JSON bypass
/// the constructor and are re-checked by the schema validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Create a table, enforcing structural invariants.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if columns.is_empty() {
            return Err(RefineError::EmptyData("table has no columns".to_string()));
        }
        for (i, col) in columns.iter().enumerate() {
            let name = col.name.trim();
            if name.is_empty() {
                return Err(RefineError::Structural(format!(
                    "column {} has an empty header",
                    i + 1
                )));
            }
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(RefineError::Structural(format!(
                    "duplicate header '{}'",
                    col.name
                )));
            }
        }
        let row_count = columns[0].len();
        if let Some(bad) = columns.iter().find(|c| c.len() != row_count) {
            return Err(RefineError::Structural(format!(
                "column '{}' has {} rows, expected {}",
                bad.name,
                bad.len(),
                row_count
            )));
        }
        Ok(Self { columns })
    }

    /// Get all columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    /// Column headers in order.
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get a column by index.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Get a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Get a specific cell.
    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.columns.get(column).and_then(|c| c.cells.get(row))
    }

    /// Overwrite a specific cell.
    pub(crate) fn set_cell(&mut self, row: usize, column: usize, value: Cell) {
        if let Some(col) = self.columns.get_mut(column) {
            if let Some(cell) = col.cells.get_mut(row) {
                *cell = value;
            }
        }
    }

    /// A row as an ordered tuple of cells.
    pub fn row(&self, index: usize) -> Option<Vec<&Cell>> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.cells[index]).collect())
    }

    /// Number of missing cells in a row.
    pub fn row_missing_count(&self, index: usize) -> usize {
        self.columns
            .iter()
            .filter_map(|c| c.cells.get(index))
            .filter(|c| c.is_missing())
            .count()
    }

    /// Stable comparison key for a row over the given column indices.
    pub(crate) fn row_key(&self, index: usize, column_indices: &[usize]) -> String {
        column_indices
            .iter()
            .filter_map(|&ci| self.cell(index, ci))
            .map(|c| c.identity_key())
            .collect::<Vec<_>>()
            .join("\u{1}")
    }

    /// Remove the given rows (indices into the current table, any order).
    pub(crate) fn remove_rows(&mut self, indices: &[usize]) {
        if indices.is_empty() {
            return;
        }
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        for col in &mut self.columns {
            let mut position = 0usize;
            let mut pending = sorted.iter().peekable();
            col.cells.retain(|_| {
                let drop = pending.peek().is_some_and(|&&r| r == position);
                if drop {
                    pending.next();
                }
                position += 1;
                !drop
            });
        }
    }

    /// Serialize the table to CSV, dates in canonical `YYYY-MM-DD` form.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(self.headers())?;
        for row in 0..self.row_count() {
            let record: Vec<String> = self
                .columns
                .iter()
                .map(|c| c.cells[row].to_string())
                .collect();
            writer.write_record(&record)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| RefineError::Structural(format!("CSV write failed: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| RefineError::Structural(format!("CSV output not UTF-8: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number_column(name: &str, values: &[f64]) -> Column {
        Column::new(
            name,
            ColumnType::Numeric,
            values.iter().map(|&v| Cell::Number(v)).collect(),
        )
    }

    #[test]
    fn test_new_rejects_duplicate_headers() {
        let result = Table::new(vec![
            number_column("id", &[1.0]),
            number_column("id", &[2.0]),
        ]);
        assert!(matches!(result, Err(RefineError::Structural(_))));
    }

    #[test]
    fn test_new_rejects_empty_header() {
        let result = Table::new(vec![number_column("  ", &[1.0])]);
        assert!(matches!(result, Err(RefineError::Structural(_))));
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let result = Table::new(vec![
            number_column("a", &[1.0, 2.0]),
            number_column("b", &[1.0]),
        ]);
        assert!(matches!(result, Err(RefineError::Structural(_))));
    }

    #[test]
    fn test_remove_rows() {
        let mut table = Table::new(vec![number_column("a", &[1.0, 2.0, 3.0, 4.0])]).unwrap();
        table.remove_rows(&[3, 1]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(0, 0), Some(&Cell::Number(1.0)));
        assert_eq!(table.cell(1, 0), Some(&Cell::Number(3.0)));
    }

    #[test]
    fn test_to_csv_string() {
        let mut col = number_column("amount", &[10.0]);
        col.cells.push(Cell::Missing);
        let name = Column::new(
            "name",
            ColumnType::Text,
            vec![Cell::Text("Bob".into()), Cell::Text("Eve".into())],
        );
        let table = Table::new(vec![name, col]).unwrap();
        let csv = table.to_csv_string().unwrap();
        assert_eq!(csv, "name,amount\nBob,10\nEve,\n");
    }
}
