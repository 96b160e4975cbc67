//! Property-based tests for the cleaning pipeline.
//!
//! These use proptest to verify the engine's core guarantees under
//! randomized inputs:
//!
//! 1. **No panics**: cleaning never crashes on structurally valid input
//! 2. **Determinism**: the same table always produces the same result
//! 3. **Idempotence**: cleaning a clean table changes nothing
//! 4. **Invariants**: interpolation follows the documented formula,
//!    duplicates always collapse to the first occurrence

use proptest::prelude::*;

use datarefine::{Cell, Column, ColumnType, DataRefine, Stage, Table};

// =============================================================================
// Test Strategies
// =============================================================================

/// Finite numeric values in a range that keeps interpolation exact enough.
fn finite_value() -> impl Strategy<Value = f64> {
    -1.0e6..1.0e6
}

/// Uppercase tokens whose casing is internally consistent by construction.
fn label_token() -> impl Strategy<Value = String> {
    "[A-Z]{2,6}"
}

fn numeric_column(name: &str, values: &[f64]) -> Column {
    Column::new(
        name,
        ColumnType::Numeric,
        values.iter().map(|&v| Cell::Number(v)).collect(),
    )
}

// =============================================================================
// Interpolation
// =============================================================================

proptest! {
    /// A single missing value between two known flanking values is imputed
    /// to exactly v_L + (v_R - v_L) / (R - L) * (i - L).
    #[test]
    fn interpolation_matches_formula(
        left in finite_value(),
        right in finite_value(),
        gap in 2usize..10,
        offset in 1usize..9,
    ) {
        prop_assume!(offset < gap);

        let mut cells = vec![Cell::Missing; gap + 1];
        cells[0] = Cell::Number(left);
        cells[gap] = Cell::Number(right);
        let table = Table::new(vec![
            numeric_column("id", &(0..=gap).map(|i| i as f64).collect::<Vec<_>>()),
            Column::new("value", ColumnType::Numeric, cells),
        ]).unwrap();

        let report = DataRefine::new().clean(table).unwrap();
        let expected = left + (right - left) / gap as f64 * offset as f64;
        let got = report.table.cell(offset, 1).unwrap().as_number().unwrap();
        prop_assert!((got - expected).abs() <= 1e-6 * expected.abs().max(1.0));
    }

    /// Boundary missing runs fall back to the mean of the known values.
    #[test]
    fn boundary_fill_is_pre_imputation_mean(
        values in prop::collection::vec(finite_value(), 2..8),
        leading in 1usize..4,
    ) {
        let mean = values.iter().sum::<f64>() / values.len() as f64;

        let mut cells = vec![Cell::Missing; leading];
        cells.extend(values.iter().map(|&v| Cell::Number(v)));
        let ids: Vec<f64> = (0..cells.len()).map(|i| i as f64).collect();
        let table = Table::new(vec![
            numeric_column("id", &ids),
            Column::new("value", ColumnType::Numeric, cells),
        ]).unwrap();

        let report = DataRefine::new().clean(table).unwrap();
        for row in 0..leading {
            let got = report.table.cell(row, 1).unwrap().as_number().unwrap();
            prop_assert!((got - mean).abs() <= 1e-6 * mean.abs().max(1.0));
        }
    }
}

// =============================================================================
// Determinism and idempotence
// =============================================================================

proptest! {
    /// Cleaning the same table twice from scratch gives identical results.
    #[test]
    fn cleaning_is_deterministic(
        ids in prop::collection::vec(0i64..50, 1..20),
        labels in prop::collection::vec(label_token(), 1..20),
    ) {
        let n = ids.len().min(labels.len());
        let make_table = || Table::new(vec![
            Column::new("id", ColumnType::Numeric,
                ids[..n].iter().map(|&v| Cell::Number(v as f64)).collect()),
            Column::new("label", ColumnType::Categorical,
                labels[..n].iter().map(|l| Cell::Text(l.clone())).collect()),
        ]).unwrap();

        let first = DataRefine::new().clean(make_table()).unwrap();
        let second = DataRefine::new().clean(make_table()).unwrap();
        prop_assert_eq!(first.table, second.table);
        prop_assert_eq!(first.log.len(), second.log.len());
    }

    /// For tables with no missing values and no duplicates, clean is
    /// idempotent: a second pass applies nothing.
    #[test]
    fn clean_tables_are_fixed_points(
        values in prop::collection::vec(finite_value(), 1..20),
        labels in prop::collection::vec(label_token(), 1..20),
    ) {
        let n = values.len().min(labels.len());
        // Unique ids guarantee no duplicates regardless of the other columns.
        let ids: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let table = Table::new(vec![
            numeric_column("id", &ids),
            numeric_column("value", &values[..n]),
            Column::new("label", ColumnType::Categorical,
                labels[..n].iter().map(|l| Cell::Text(l.clone())).collect()),
        ]).unwrap();

        let first = DataRefine::new().clean(table.clone()).unwrap();
        prop_assert_eq!(&first.table, &table);

        let second = DataRefine::new().clean(first.table.clone()).unwrap();
        prop_assert_eq!(&second.table, &first.table);
        // Only the validation marker; no operation was applied.
        prop_assert_eq!(second.log.len(), 1);
        prop_assert_eq!(second.log[0].stage, Stage::Validation);
    }
}

// =============================================================================
// Deduplication
// =============================================================================

proptest! {
    /// After cleaning, no two surviving rows are identical, every
    /// surviving row appeared in the input, and the first occurrence of
    /// each duplicate group survives.
    #[test]
    fn duplicates_collapse_to_first_occurrence(
        rows in prop::collection::vec((0i64..4, 0i64..4), 1..16),
    ) {
        let table = Table::new(vec![
            numeric_column("id", &rows.iter().map(|r| r.0 as f64).collect::<Vec<_>>()),
            numeric_column("value", &rows.iter().map(|r| r.1 as f64).collect::<Vec<_>>()),
        ]).unwrap();

        let report = DataRefine::new().clean(table).unwrap();

        let survivors: Vec<(i64, i64)> = (0..report.table.row_count())
            .map(|r| {
                (
                    report.table.cell(r, 0).unwrap().as_number().unwrap() as i64,
                    report.table.cell(r, 1).unwrap().as_number().unwrap() as i64,
                )
            })
            .collect();

        // Every survivor appeared in the input.
        for row in &survivors {
            prop_assert!(rows.contains(row));
        }
        // No two survivors share a full row; keys are unique after
        // conflict resolution under the default policy.
        let mut keys: Vec<i64> = survivors.iter().map(|r| r.0).collect();
        keys.sort_unstable();
        let before = keys.len();
        keys.dedup();
        prop_assert_eq!(keys.len(), before);

        // The first row of the input always survives: it is the first
        // occurrence of its duplicate group and ties keep it.
        prop_assert!(survivors.contains(&rows[0]));
    }
}
