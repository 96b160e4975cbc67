//! DataRefine: a deterministic data-cleaning engine for tabular datasets.
//!
//! The engine validates an input table, fills missing values, resolves
//! duplicate rows, normalizes cell representations, and reports every
//! operation it applied.
//!
//! # Core Principles
//!
//! - **Deterministic**: the same table and configuration always produce
//!   the same cleaned table and the same operation log
//! - **Fail fast**: structural problems block the run before any cell
//!   is touched
//! - **Full provenance**: every fill, removal, and coercion is logged
//!   with the rule applied and the values involved
//!
//! # Example
//!
//! ```no_run
//! use datarefine::{DataRefine, Parser};
//!
//! let table = Parser::new()
//!     .from_csv_str("id,age,city\n1,25,NY\n2,,LA\n3,35,NY\n")
//!     .unwrap();
//!
//! let report = DataRefine::new().clean(table).unwrap();
//! println!("{}", report.render());
//! ```

pub mod clean;
pub mod error;
pub mod input;
pub mod report;
pub mod table;
pub mod validate;

mod refine;

pub use crate::refine::{CleanConfig, ConflictPolicy, DataRefine};
pub use clean::{CaseRule, ConflictResolver};
pub use error::{RefineError, Result};
pub use input::{Parser, ParserConfig, SourceMetadata};
pub use report::{
    CleaningReport, CleaningSummary, ConflictChoice, ConflictRecord, ConflictResolution,
    OperationLogEntry, Stage,
};
pub use table::{Cell, Column, ColumnType, Table};
pub use validate::{Issue, IssueKind, Severity, ValidationFailure, ValidationResult};
