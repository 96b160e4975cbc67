//! Append-only operation log.

use serde::{Deserialize, Serialize};

/// Pipeline stage that produced a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validation,
    Imputation,
    Deduplication,
    Normalization,
}

impl Stage {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Validation => "Validation",
            Stage::Imputation => "Imputation",
            Stage::Deduplication => "Deduplication",
            Stage::Normalization => "Normalization",
        }
    }
}

/// One applied operation: the rule, what it touched, and the working.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationLogEntry {
    /// Stage that applied the operation.
    pub stage: Stage,
    /// Rule name, e.g. "linear interpolation" or "most-frequent fill".
    pub rule: String,
    /// Affected column, if column-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Affected row (0-based), if row-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Value before the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Value after the operation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// Human-readable explanation, including the formula where one applies.
    pub explanation: String,
}

impl OperationLogEntry {
    /// Create an entry.
    pub fn new(stage: Stage, rule: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            stage,
            rule: rule.into(),
            column: None,
            row: None,
            before: None,
            after: None,
            explanation: explanation.into(),
        }
    }

    /// Set the affected column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the affected row.
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Set the before value.
    pub fn with_before(mut self, before: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self
    }

    /// Set the after value.
    pub fn with_after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_builder() {
        let entry = OperationLogEntry::new(Stage::Imputation, "mean imputation", "filled with 15")
            .with_column("age")
            .with_row(3)
            .with_after("15");
        assert_eq!(entry.stage, Stage::Imputation);
        assert_eq!(entry.column.as_deref(), Some("age"));
        assert_eq!(entry.row, Some(3));
        assert_eq!(entry.before, None);
        assert_eq!(entry.after.as_deref(), Some("15"));
    }
}
