//! Conflicting duplicate records.

use serde::{Deserialize, Serialize};

use crate::table::Cell;

/// A caller decision on a conflicting duplicate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictChoice {
    /// Keep the first occurrence, drop the other.
    KeepFirst,
    /// Keep the second occurrence, drop the first.
    KeepSecond,
    /// Deliberately keep both rows.
    KeepBoth,
}

/// How a conflict ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictResolution {
    KeptFirst,
    KeptSecond,
    KeptBoth,
    /// No policy decision was available; both rows remain, flagged.
    Unresolved,
}

impl ConflictResolution {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ConflictResolution::KeptFirst => "kept first",
            ConflictResolution::KeptSecond => "kept second",
            ConflictResolution::KeptBoth => "kept both",
            ConflictResolution::Unresolved => "unresolved",
        }
    }

    /// True if one of the two rows was discarded.
    pub fn dropped_a_row(&self) -> bool {
        matches!(
            self,
            ConflictResolution::KeptFirst | ConflictResolution::KeptSecond
        )
    }
}

/// Two rows sharing an identifying key but disagreeing on other fields.
///
/// Row indices refer to the table as it entered deduplication (after
/// imputation, before any rows were removed). Records are never silently
/// dropped: every detected conflict appears in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Display form of the shared key.
    pub key: String,
    /// Index of the earlier row.
    pub first_row: usize,
    /// Index of the later row.
    pub second_row: usize,
    /// Names of the columns where the rows disagree.
    pub differing_columns: Vec<String>,
    /// Full candidate cells of the earlier row.
    pub first_candidate: Vec<Cell>,
    /// Full candidate cells of the later row.
    pub second_candidate: Vec<Cell>,
    /// Outcome of resolution.
    pub resolution: ConflictResolution,
}
