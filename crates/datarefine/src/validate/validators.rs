//! Validation checks and the engine that runs them.

use indexmap::IndexMap;

use crate::input::{parse_date, strip_numeric_decoration};
use crate::refine::CleanConfig;
use crate::table::{Cell, Column, ColumnType, Table};

use super::issue::{Issue, IssueKind, ValidationResult};

/// Fraction of non-missing cells that must be incompatible before a
/// column is reported as a type mismatch rather than per-cell format
/// problems left to the normalizer.
const TYPE_MISMATCH_RATIO: f64 = 0.5;

/// A single validation check.
trait Check {
    /// Short name for reporting.
    fn name(&self) -> &'static str;

    /// Run the check, returning any issues found.
    fn run(&self, table: &Table, config: &CleanConfig) -> Vec<Issue>;
}

// ============================================================================
// Structural check
// ============================================================================

/// Verifies headers and table shape. Any issue here is fatal.
///
/// `Table::new` enforces the same invariants, so this only fires for
/// tables that bypassed the constructor (e.g. deserialized from JSON).
struct HeaderCheck;

impl Check for HeaderCheck {
    fn name(&self) -> &'static str {
        "headers"
    }

    fn run(&self, table: &Table, _config: &CleanConfig) -> Vec<Issue> {
        let mut issues = Vec::new();

        if table.column_count() == 0 {
            issues.push(Issue::new(IssueKind::StructuralError, "table has no columns"));
            return issues;
        }
        if table.row_count() == 0 {
            issues.push(Issue::new(IssueKind::StructuralError, "table has no rows"));
        }

        let headers = table.headers();
        for (i, header) in headers.iter().enumerate() {
            if header.trim().is_empty() {
                issues.push(Issue::new(
                    IssueKind::StructuralError,
                    format!("column {} has an empty header", i + 1),
                ));
            }
            if headers[..i].contains(header) {
                issues.push(Issue::new(
                    IssueKind::StructuralError,
                    format!("duplicate header '{}'", header),
                ));
            }
        }

        let expected = table.row_count();
        for col in table.columns() {
            if col.len() != expected {
                issues.push(
                    Issue::new(
                        IssueKind::StructuralError,
                        format!("column '{}' has {} rows, expected {}", col.name, col.len(), expected),
                    )
                    .with_column(&col.name),
                );
            }
        }

        issues
    }
}

// ============================================================================
// Type consistency check
// ============================================================================

/// Flags columns whose cells are wholesale incompatible with the declared
/// type. Incidental unparsable cells are left for the normalizer, which
/// reports them per cell as format errors.
struct TypeConsistencyCheck;

impl TypeConsistencyCheck {
    /// A cell that neither matches the declared type nor can be coerced
    /// to it by normalization.
    fn is_incompatible(cell: &Cell, column: &Column, config: &CleanConfig) -> bool {
        match (column.column_type, cell) {
            (_, Cell::Missing) => false,
            (ColumnType::Numeric, Cell::Number(_)) => false,
            (ColumnType::Numeric, Cell::Text(s)) => strip_numeric_decoration(s).is_none(),
            (ColumnType::Numeric, Cell::Date(_)) => true,
            (ColumnType::Date, Cell::Date(_)) => false,
            (ColumnType::Date, Cell::Text(s)) => parse_date(s, &config.date_formats).is_none(),
            (ColumnType::Date, Cell::Number(_)) => true,
            // Textual columns can display any value.
            (ColumnType::Categorical | ColumnType::Text, _) => false,
        }
    }
}

impl Check for TypeConsistencyCheck {
    fn name(&self) -> &'static str {
        "type_consistency"
    }

    fn run(&self, table: &Table, config: &CleanConfig) -> Vec<Issue> {
        let mut issues = Vec::new();

        for column in table.columns() {
            let non_missing = column.len() - column.missing_count();
            if non_missing == 0 {
                continue;
            }

            let mut incompatible = 0usize;
            let mut sample_rows: Vec<usize> = Vec::new();
            for (row, cell) in column.cells.iter().enumerate() {
                if Self::is_incompatible(cell, column, config) {
                    incompatible += 1;
                    if sample_rows.len() < 3 {
                        sample_rows.push(row);
                    }
                }
            }

            if incompatible == 0 {
                continue;
            }
            let ratio = incompatible as f64 / non_missing as f64;
            if ratio < TYPE_MISMATCH_RATIO {
                continue;
            }

            issues.push(
                Issue::new(
                    IssueKind::TypeError,
                    format!(
                        "{} of {} value(s) are not {} (e.g. rows {:?})",
                        incompatible,
                        non_missing,
                        column.column_type.label(),
                        sample_rows
                    ),
                )
                .with_column(&column.name),
            );
        }

        issues
    }
}

// ============================================================================
// Completeness check
// ============================================================================

/// Flags columns whose missing-value ratio exceeds the configured
/// threshold. Cleaning still proceeds; the report surfaces these first.
struct CompletenessCheck;

impl Check for CompletenessCheck {
    fn name(&self) -> &'static str {
        "completeness"
    }

    fn run(&self, table: &Table, config: &CleanConfig) -> Vec<Issue> {
        let mut issues = Vec::new();

        for column in table.columns() {
            let ratio = column.missing_ratio();
            if ratio > config.missing_threshold {
                issues.push(
                    Issue::new(
                        IssueKind::SeverityError,
                        format!(
                            "{:.0}% of values are missing (threshold {:.0}%)",
                            ratio * 100.0,
                            config.missing_threshold * 100.0
                        ),
                    )
                    .with_column(&column.name),
                );
            }
        }

        issues
    }
}

// ============================================================================
// Key conflict check
// ============================================================================

/// Flags groups of rows that share an identifying key but disagree on
/// other fields. Non-blocking; the duplicate resolver acts on these.
struct KeyConflictCheck;

impl Check for KeyConflictCheck {
    fn name(&self) -> &'static str {
        "key_conflicts"
    }

    fn run(&self, table: &Table, config: &CleanConfig) -> Vec<Issue> {
        let key_indices = config.key_indices(table);
        let all_indices: Vec<usize> = (0..table.column_count()).collect();

        let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
        for row in 0..table.row_count() {
            groups
                .entry(table.row_key(row, &key_indices))
                .or_default()
                .push(row);
        }

        let mut issues = Vec::new();
        for rows in groups.values() {
            if rows.len() < 2 {
                continue;
            }
            let first = rows[0];
            let conflicting: Vec<usize> = rows[1..]
                .iter()
                .copied()
                .filter(|&r| table.row_key(r, &all_indices) != table.row_key(first, &all_indices))
                .collect();
            if conflicting.is_empty() {
                continue;
            }

            let key_display: Vec<String> = key_indices
                .iter()
                .map(|&ci| table.cell(first, ci).map(|c| c.to_string()).unwrap_or_default())
                .collect();
            issues.push(
                Issue::new(
                    IssueKind::ConflictWarning,
                    format!(
                        "key '{}' appears in rows {:?} with differing fields",
                        key_display.join("/"),
                        rows
                    ),
                )
                .with_row(first),
            );
        }

        issues
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Runs the validation checks in order, short-circuiting on structural
/// failure and accumulating everything else.
pub struct SchemaValidator {
    checks: Vec<Box<dyn Check>>,
}

impl SchemaValidator {
    /// Create a validator with the standard check sequence.
    pub fn new() -> Self {
        Self {
            checks: vec![
                Box::new(TypeConsistencyCheck),
                Box::new(CompletenessCheck),
                Box::new(KeyConflictCheck),
            ],
        }
    }

    /// Validate a table without mutating it.
    pub fn validate(&self, table: &Table, config: &CleanConfig) -> ValidationResult {
        let structural = HeaderCheck.run(table, config);
        if !structural.is_empty() {
            return ValidationResult::fail(structural);
        }

        let mut issues = Vec::new();
        for check in &self.checks {
            issues.extend(check.run(table, config));
        }
        ValidationResult::pass(issues)
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, Column, ColumnType};

    fn config() -> CleanConfig {
        CleanConfig::default()
    }

    fn table_with(columns: Vec<Column>) -> Table {
        Table::new(columns).unwrap()
    }

    #[test]
    fn test_validate_clean_table_passes() {
        let table = table_with(vec![
            Column::new(
                "id",
                ColumnType::Numeric,
                vec![Cell::Number(1.0), Cell::Number(2.0)],
            ),
            Column::new(
                "city",
                ColumnType::Categorical,
                vec![Cell::Text("NY".into()), Cell::Text("LA".into())],
            ),
        ]);
        let result = SchemaValidator::new().validate(&table, &config());
        assert!(result.passed);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_duplicate_header_fails_structurally() {
        // Bypass the constructor the way a deserialized table would.
        let json = r#"{"columns": [
            {"name": "id", "column_type": "numeric", "cells": [{"type": "number", "value": 1.0}]},
            {"name": "id", "column_type": "numeric", "cells": [{"type": "number", "value": 2.0}]}
        ]}"#;
        let table: Table = serde_json::from_str(json).unwrap();
        let result = SchemaValidator::new().validate(&table, &config());
        assert!(!result.passed);
        assert!(result.has_kind(IssueKind::StructuralError));
    }

    #[test]
    fn test_mixed_numeric_column_yields_type_error() {
        let table = table_with(vec![Column::new(
            "amount",
            ColumnType::Numeric,
            vec![
                Cell::Text("abc".into()),
                Cell::Text("def".into()),
                Cell::Number(3.0),
            ],
        )]);
        let result = SchemaValidator::new().validate(&table, &config());
        assert!(result.passed);
        assert!(result.has_kind(IssueKind::TypeError));
    }

    #[test]
    fn test_recoverable_decoration_is_not_a_type_error() {
        let table = table_with(vec![Column::new(
            "amount",
            ColumnType::Numeric,
            vec![Cell::Text("$1,200".into()), Cell::Number(3.0)],
        )]);
        let result = SchemaValidator::new().validate(&table, &config());
        assert!(!result.has_kind(IssueKind::TypeError));
    }

    #[test]
    fn test_excessive_missingness_yields_severity_error() {
        let table = table_with(vec![Column::new(
            "age",
            ColumnType::Numeric,
            vec![Cell::Missing, Cell::Missing, Cell::Number(30.0)],
        )]);
        let result = SchemaValidator::new().validate(&table, &config());
        assert!(result.has_kind(IssueKind::SeverityError));
    }

    #[test]
    fn test_key_conflict_warning() {
        let table = table_with(vec![
            Column::new(
                "id",
                ColumnType::Numeric,
                vec![Cell::Number(5.0), Cell::Number(5.0)],
            ),
            Column::new(
                "amt",
                ColumnType::Numeric,
                vec![Cell::Number(100.0), Cell::Number(200.0)],
            ),
        ]);
        let result = SchemaValidator::new().validate(&table, &config());
        assert!(result.has_kind(IssueKind::ConflictWarning));
    }

    #[test]
    fn test_exact_duplicates_are_not_conflicts() {
        let table = table_with(vec![
            Column::new(
                "id",
                ColumnType::Numeric,
                vec![Cell::Number(5.0), Cell::Number(5.0)],
            ),
            Column::new(
                "amt",
                ColumnType::Numeric,
                vec![Cell::Number(100.0), Cell::Number(100.0)],
            ),
        ]);
        let result = SchemaValidator::new().validate(&table, &config());
        assert!(!result.has_kind(IssueKind::ConflictWarning));
    }
}
