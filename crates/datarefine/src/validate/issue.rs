//! Structured data-quality issues.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of issue detected by validation or cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Bad headers, empty table, ragged columns. Fatal: blocks the run.
    StructuralError,
    /// Cells incompatible with the declared column type.
    TypeError,
    /// Excessive missingness in a column.
    SeverityError,
    /// A cell value that cannot be coerced to the column's type.
    FormatError,
    /// Rows sharing a key but disagreeing on other fields.
    ConflictWarning,
}

impl IssueKind {
    /// Get a human-readable label for the issue kind.
    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::StructuralError => "Structural Error",
            IssueKind::TypeError => "Type Error",
            IssueKind::SeverityError => "Severity Error",
            IssueKind::FormatError => "Format Error",
            IssueKind::ConflictWarning => "Conflict Warning",
        }
    }

    /// Default severity for this kind of issue.
    pub fn default_severity(&self) -> Severity {
        match self {
            IssueKind::StructuralError | IssueKind::TypeError => Severity::Error,
            IssueKind::SeverityError | IssueKind::FormatError | IssueKind::ConflictWarning => {
                Severity::Warning
            }
        }
    }
}

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only, may not require action.
    Info,
    /// Potential issue that should be reviewed.
    Warning,
    /// Definite issue that should be addressed.
    Error,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// A structured, actionable data-quality issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Kind of issue.
    pub kind: IssueKind,
    /// Severity level.
    pub severity: Severity,
    /// Affected column name, if column-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Affected row index (0-based), if row-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    /// Human-readable, correctable description.
    pub message: String,
}

impl Issue {
    /// Create an issue with the kind's default severity.
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            column: None,
            row: None,
            message: message.into(),
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

    /// Override the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.column {
            Some(column) => write!(f, "[{}] {}: {}", column, self.kind.label(), self.message),
            None => write!(f, "{}: {}", self.kind.label(), self.message),
        }
    }
}

/// Outcome of validating one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True unless a structural error was found.
    pub passed: bool,
    /// All issues, in check order.
    pub issues: Vec<Issue>,
}

impl ValidationResult {
    /// A passing result carrying the given non-fatal issues.
    pub fn pass(issues: Vec<Issue>) -> Self {
        Self {
            passed: true,
            issues,
        }
    }

    /// A failing result.
    pub fn fail(issues: Vec<Issue>) -> Self {
        Self {
            passed: false,
            issues,
        }
    }

    /// Issues of a given kind.
    pub fn of_kind(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }

    /// True if any issue of the given kind was found.
    pub fn has_kind(&self, kind: IssueKind) -> bool {
        self.of_kind(kind).next().is_some()
    }
}

/// Payload for a run rejected by the validation gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// The issues that blocked the run.
    pub issues: Vec<Issue>,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.issues.iter().map(|i| i.to_string()).collect();
        write!(
            f,
            "{} blocking issue(s): {}",
            self.issues.len(),
            messages.join("; ")
        )
    }
}
