//! Schema validation: the gate that must pass before cleaning runs.

mod issue;
mod validators;

pub use issue::{Issue, IssueKind, Severity, ValidationFailure, ValidationResult};
pub use validators::SchemaValidator;
