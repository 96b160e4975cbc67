//! Missing-value imputation.

use crate::report::{OperationLogEntry, Stage};
use crate::table::{Cell, ColumnType, Table};

/// Numeric sentinel for columns with no known values at all.
const NUMERIC_SENTINEL: f64 = 0.0;

/// Default fill for entirely missing categorical/text columns.
const TEXT_DEFAULT: &str = "Unknown";

/// Fills missing cells: linear interpolation over row position for
/// numeric columns, mode for categorical/text/date columns, with
/// explicit fallbacks for boundary runs and degenerate columns.
///
/// This stage never fails; degenerate cases are logged, not fatal.
pub struct Imputer;

impl Imputer {
    /// Create a new imputer.
    pub fn new() -> Self {
        Self
    }

    /// Fill every missing cell, returning one log entry per fill.
    ///
    /// Columns are processed in table order, so the log ordering is
    /// deterministic (column index, then row index).
    pub fn impute(&self, table: &mut Table) -> Vec<OperationLogEntry> {
        let mut log = Vec::new();
        for col_idx in 0..table.column_count() {
            let column_type = table.columns()[col_idx].column_type;
            match column_type {
                ColumnType::Numeric => self.impute_numeric(table, col_idx, &mut log),
                ColumnType::Date => self.impute_date(table, col_idx, &mut log),
                ColumnType::Categorical | ColumnType::Text => {
                    self.impute_textual(table, col_idx, &mut log)
                }
            }
        }
        log
    }

    /// Fallback-only fill for specific cells, used to re-impute values
    /// the normalizer demoted to missing. Interpolation is not retried;
    /// these cells get the column mean or mode directly.
    pub(crate) fn impute_cells(
        &self,
        table: &mut Table,
        targets: &[(usize, usize)],
    ) -> Vec<OperationLogEntry> {
        let mut log = Vec::new();
        for &(col_idx, row) in targets {
            let column = &table.columns()[col_idx];
            let name = column.name.clone();
            match column.column_type {
                ColumnType::Numeric => {
                    let value = column.mean().unwrap_or(NUMERIC_SENTINEL);
                    let rule = if column.mean().is_some() {
                        "mean imputation"
                    } else {
                        "sentinel fill"
                    };
                    table.set_cell(row, col_idx, Cell::Number(value));
                    log.push(
                        OperationLogEntry::new(
                            Stage::Imputation,
                            rule,
                            format!("re-imputed after format correction with {}", Cell::Number(value)),
                        )
                        .with_column(&name)
                        .with_row(row)
                        .with_after(Cell::Number(value).to_string()),
                    );
                }
                ColumnType::Date => {
                    if let Some(mode) = column.mode_date() {
                        table.set_cell(row, col_idx, Cell::Date(mode));
                        log.push(
                            OperationLogEntry::new(
                                Stage::Imputation,
                                "most-frequent fill",
                                format!("re-imputed after format correction with {}", mode),
                            )
                            .with_column(&name)
                            .with_row(row)
                            .with_after(mode.to_string()),
                        );
                    }
                }
                ColumnType::Categorical | ColumnType::Text => {
                    let value = column.mode().unwrap_or_else(|| TEXT_DEFAULT.to_string());
                    table.set_cell(row, col_idx, Cell::Text(value.clone()));
                    log.push(
                        OperationLogEntry::new(
                            Stage::Imputation,
                            "most-frequent fill",
                            format!("re-imputed after format correction with '{}'", value),
                        )
                        .with_column(&name)
                        .with_row(row)
                        .with_after(value),
                    );
                }
            }
        }
        log
    }

    fn impute_numeric(&self, table: &mut Table, col_idx: usize, log: &mut Vec<OperationLogEntry>) {
        let column = &table.columns()[col_idx];
        let name = column.name.clone();
        // Known values and the mean are captured before any fill so that
        // fallbacks use the pre-imputation distribution.
        let known = column.numeric_values();
        let mean = column.mean();
        let missing: Vec<usize> = column
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_missing())
            .map(|(i, _)| i)
            .collect();

        if missing.is_empty() {
            return;
        }

        if known.is_empty() {
            for row in missing {
                table.set_cell(row, col_idx, Cell::Number(NUMERIC_SENTINEL));
                log.push(
                    OperationLogEntry::new(
                        Stage::Imputation,
                        "sentinel fill",
                        format!(
                            "column has no numeric values; filled with sentinel {}",
                            Cell::Number(NUMERIC_SENTINEL)
                        ),
                    )
                    .with_column(&name)
                    .with_row(row)
                    .with_after(Cell::Number(NUMERIC_SENTINEL).to_string()),
                );
            }
            return;
        }

        for row in missing {
            // known is sorted by row position; find flanking neighbors.
            let split = known.partition_point(|&(pos, _)| pos < row);
            let left = (split > 0).then(|| known[split - 1]);
            let right = known.get(split).copied();

            match (left, right) {
                (Some((l, vl)), Some((r, vr))) => {
                    let value = vl + (vr - vl) / (r - l) as f64 * (row - l) as f64;
                    table.set_cell(row, col_idx, Cell::Number(value));
                    log.push(
                        OperationLogEntry::new(
                            Stage::Imputation,
                            "linear interpolation",
                            format!(
                                "{} + ({} - {}) * ({} - {}) / ({} - {}) = {}",
                                Cell::Number(vl),
                                Cell::Number(vr),
                                Cell::Number(vl),
                                row,
                                l,
                                r,
                                l,
                                Cell::Number(value)
                            ),
                        )
                        .with_column(&name)
                        .with_row(row)
                        .with_after(Cell::Number(value).to_string()),
                    );
                }
                _ => {
                    let value = mean.expect("known is non-empty");
                    let side = if left.is_none() { "left" } else { "right" };
                    table.set_cell(row, col_idx, Cell::Number(value));
                    log.push(
                        OperationLogEntry::new(
                            Stage::Imputation,
                            "mean imputation",
                            format!(
                                "no {} neighbor; filled with column mean {}",
                                side,
                                Cell::Number(value)
                            ),
                        )
                        .with_column(&name)
                        .with_row(row)
                        .with_after(Cell::Number(value).to_string()),
                    );
                }
            }
        }
    }

    fn impute_date(&self, table: &mut Table, col_idx: usize, log: &mut Vec<OperationLogEntry>) {
        let column = &table.columns()[col_idx];
        let name = column.name.clone();
        let missing: Vec<usize> = column
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_missing())
            .map(|(i, _)| i)
            .collect();

        if missing.is_empty() {
            return;
        }

        match column.mode_date() {
            Some(mode) => {
                for row in missing {
                    table.set_cell(row, col_idx, Cell::Date(mode));
                    log.push(
                        OperationLogEntry::new(
                            Stage::Imputation,
                            "most-frequent fill",
                            format!("most frequent date {}", mode),
                        )
                        .with_column(&name)
                        .with_row(row)
                        .with_after(mode.to_string()),
                    );
                }
            }
            None => {
                // There is no sentinel date; leave the cells missing and
                // record the degenerate case once.
                log.push(
                    OperationLogEntry::new(
                        Stage::Imputation,
                        "default fill",
                        format!(
                            "column has no dates; {} missing value(s) left in place",
                            missing.len()
                        ),
                    )
                    .with_column(&name),
                );
            }
        }
    }

    fn impute_textual(&self, table: &mut Table, col_idx: usize, log: &mut Vec<OperationLogEntry>) {
        let column = &table.columns()[col_idx];
        let name = column.name.clone();
        let mode = column.mode();
        let missing: Vec<usize> = column
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_missing())
            .map(|(i, _)| i)
            .collect();

        if missing.is_empty() {
            return;
        }

        match mode {
            Some(value) => {
                for row in missing {
                    table.set_cell(row, col_idx, Cell::Text(value.clone()));
                    log.push(
                        OperationLogEntry::new(
                            Stage::Imputation,
                            "most-frequent fill",
                            format!("most frequent value '{}'", value),
                        )
                        .with_column(&name)
                        .with_row(row)
                        .with_after(value.clone()),
                    );
                }
            }
            None => {
                for row in missing {
                    table.set_cell(row, col_idx, Cell::Text(TEXT_DEFAULT.to_string()));
                    log.push(
                        OperationLogEntry::new(
                            Stage::Imputation,
                            "default fill",
                            format!("column has no values; filled with '{}'", TEXT_DEFAULT),
                        )
                        .with_column(&name)
                        .with_row(row)
                        .with_after(TEXT_DEFAULT),
                    );
                }
            }
        }
    }
}

impl Default for Imputer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn numeric_table(cells: Vec<Cell>) -> Table {
        Table::new(vec![Column::new("x", ColumnType::Numeric, cells)]).unwrap()
    }

    #[test]
    fn test_linear_interpolation_midpoint() {
        let mut table = numeric_table(vec![
            Cell::Number(10.0),
            Cell::Missing,
            Cell::Number(30.0),
        ]);
        let log = Imputer::new().impute(&mut table);

        assert_eq!(table.cell(1, 0), Some(&Cell::Number(20.0)));
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].rule, "linear interpolation");
        assert!(log[0].explanation.contains("= 20"));
    }

    #[test]
    fn test_interpolation_over_position_gap() {
        // Known at rows 0 and 3, missing at 1: 10 + (40-10)/3 * 1 = 20.
        let mut table = numeric_table(vec![
            Cell::Number(10.0),
            Cell::Missing,
            Cell::Missing,
            Cell::Number(40.0),
        ]);
        Imputer::new().impute(&mut table);

        assert_eq!(table.cell(1, 0), Some(&Cell::Number(20.0)));
        assert_eq!(table.cell(2, 0), Some(&Cell::Number(30.0)));
    }

    #[test]
    fn test_boundary_missing_uses_mean() {
        let mut table = numeric_table(vec![
            Cell::Missing,
            Cell::Number(10.0),
            Cell::Number(30.0),
        ]);
        let log = Imputer::new().impute(&mut table);

        assert_eq!(table.cell(0, 0), Some(&Cell::Number(20.0)));
        assert_eq!(log[0].rule, "mean imputation");
    }

    #[test]
    fn test_all_missing_numeric_uses_sentinel() {
        let mut table = numeric_table(vec![Cell::Missing, Cell::Missing]);
        let log = Imputer::new().impute(&mut table);

        assert_eq!(table.cell(0, 0), Some(&Cell::Number(0.0)));
        assert_eq!(log[0].rule, "sentinel fill");
    }

    #[test]
    fn test_text_cells_are_not_neighbors() {
        // "$30" has not been normalized yet; interpolation must not use it.
        let mut table = numeric_table(vec![
            Cell::Number(10.0),
            Cell::Missing,
            Cell::Text("$30".into()),
            Cell::Number(40.0),
        ]);
        Imputer::new().impute(&mut table);

        // Neighbors are rows 0 and 3: 10 + (40-10)/3 * 1 = 20.
        assert_eq!(table.cell(1, 0), Some(&Cell::Number(20.0)));
    }

    #[test]
    fn test_categorical_mode_fill() {
        let mut table = Table::new(vec![Column::new(
            "city",
            ColumnType::Categorical,
            vec![
                Cell::Text("NY".into()),
                Cell::Missing,
                Cell::Text("NY".into()),
                Cell::Text("LA".into()),
            ],
        )])
        .unwrap();
        let log = Imputer::new().impute(&mut table);

        assert_eq!(table.cell(1, 0), Some(&Cell::Text("NY".into())));
        assert_eq!(log[0].rule, "most-frequent fill");
    }

    #[test]
    fn test_all_missing_categorical_fills_unknown() {
        let mut table = Table::new(vec![Column::new(
            "city",
            ColumnType::Categorical,
            vec![Cell::Missing, Cell::Missing],
        )])
        .unwrap();
        Imputer::new().impute(&mut table);

        assert_eq!(table.cell(0, 0), Some(&Cell::Text("Unknown".into())));
    }

    #[test]
    fn test_no_missing_no_log() {
        let mut table = numeric_table(vec![Cell::Number(1.0), Cell::Number(2.0)]);
        let log = Imputer::new().impute(&mut table);
        assert!(log.is_empty());
    }
}
