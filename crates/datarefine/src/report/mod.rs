//! Cleaning report: operation log, conflicts, summary, rendering.

mod conflict;
mod log;

pub use conflict::{ConflictChoice, ConflictRecord, ConflictResolution};
pub use log::{OperationLogEntry, Stage};

use serde::{Deserialize, Serialize};

use crate::table::Table;
use crate::validate::{Issue, Severity};

/// Issue counts by severity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueCounts {
    pub error: usize,
    pub warning: usize,
    pub info: usize,
}

/// Aggregate numbers for one cleaning run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Rows in the validated input table.
    pub rows_before: usize,
    /// Rows in the cleaned table.
    pub rows_after: usize,
    /// Number of columns.
    pub columns: usize,
    /// Numeric cells filled by interpolation, mean, or sentinel.
    pub numeric_cells_imputed: usize,
    /// Categorical/text/date cells filled by mode or default.
    pub categorical_cells_imputed: usize,
    /// Exact duplicate rows removed.
    pub duplicates_removed: usize,
    /// Conflicting duplicates resolved by policy or callback.
    pub conflicts_resolved: usize,
    /// Conflicting duplicates left for the caller.
    pub conflicts_unresolved: usize,
    /// Cells changed by normalization.
    pub cells_normalized: usize,
    /// Issue counts by severity.
    pub issues: IssueCounts,
}

/// The result of one cleaning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    /// The cleaned table.
    pub table: Table,
    /// Every operation applied, in execution order.
    pub log: Vec<OperationLogEntry>,
    /// Non-fatal issues from validation and cleaning.
    pub issues: Vec<Issue>,
    /// Conflicting duplicates, resolved and unresolved.
    pub conflicts: Vec<ConflictRecord>,
    /// Aggregate numbers.
    pub summary: CleaningSummary,
}

impl CleaningReport {
    /// Unresolved conflicts only.
    pub fn unresolved_conflicts(&self) -> impl Iterator<Item = &ConflictRecord> {
        self.conflicts
            .iter()
            .filter(|c| c.resolution == ConflictResolution::Unresolved)
    }

    /// Issues at or above the given severity.
    pub fn issues_at_least(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.severity >= severity)
    }

    /// Render the report as plain text, section by section.
    pub fn render(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();

        out.push_str("Cleaning Report\n\n");

        out.push_str("1. Data Overview:\n");
        out.push_str(&format!("   - Total Rows: {}\n", s.rows_before));
        out.push_str(&format!("   - Total Columns: {}\n\n", s.columns));

        out.push_str("2. Missing Data Handling:\n");
        out.push_str(&format!(
            "   - Numeric cells imputed: {}\n",
            s.numeric_cells_imputed
        ));
        out.push_str(&format!(
            "   - Categorical cells imputed: {}\n",
            s.categorical_cells_imputed
        ));
        let interpolations: Vec<&OperationLogEntry> = self
            .log
            .iter()
            .filter(|e| e.stage == Stage::Imputation && e.rule == "linear interpolation")
            .collect();
        if interpolations.is_empty() {
            out.push_str("   No interpolation performed\n\n");
        } else {
            out.push_str("   Interpolation Details:\n");
            for entry in interpolations {
                out.push_str(&format!(
                    "   - {} row {}: {}\n",
                    entry.column.as_deref().unwrap_or("?"),
                    entry.row.map(|r| r.to_string()).unwrap_or_default(),
                    entry.explanation
                ));
            }
            out.push('\n');
        }

        out.push_str("3. Duplicate Records:\n");
        out.push_str(&format!(
            "   - Exact Duplicates Removed: {}\n",
            s.duplicates_removed
        ));
        out.push_str(&format!(
            "   - Conflicts Resolved: {}\n",
            s.conflicts_resolved
        ));
        out.push_str(&format!(
            "   - Conflicts Unresolved: {}\n\n",
            s.conflicts_unresolved
        ));

        out.push_str("4. Data Normalization:\n");
        out.push_str(&format!("   - Cells Normalized: {}\n\n", s.cells_normalized));

        out.push_str("5. Final Dataset Status:\n");
        out.push_str(&format!("   - Rows After Cleaning: {}\n", s.rows_after));
        out.push_str(&format!("   - Columns After Cleaning: {}\n", s.columns));

        if !self.issues.is_empty() {
            out.push_str("\nIssues:\n");
            for issue in &self.issues {
                out.push_str(&format!("   - {}\n", issue));
            }
        }

        out
    }
}
