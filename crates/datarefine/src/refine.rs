//! Main DataRefine engine and public API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clean::{CaseRule, ConflictResolver, DuplicateResolver, Imputer, Normalizer};
use crate::error::{RefineError, Result};
use crate::input::DEFAULT_DATE_FORMATS;
use crate::report::{CleaningReport, CleaningSummary, IssueCounts, Stage};
use crate::report::{ConflictResolution, OperationLogEntry};
use crate::table::Table;
use crate::validate::{
    Issue, IssueKind, SchemaValidator, Severity, ValidationFailure, ValidationResult,
};

/// How conflicting duplicates are decided when the caller has not
/// installed a resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Keep the row with fewer originally-missing fields; ties keep the
    /// first occurrence.
    #[default]
    PreferComplete,
    /// Leave undecided conflicts in the table, flagged for the caller.
    Manual,
}

/// Per-run configuration for one cleaning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanConfig {
    /// Casing rule for text/categorical columns.
    pub casing: CaseRule,
    /// Missing-value ratio above which a column is flagged prominently.
    pub missing_threshold: f64,
    /// Accepted date input formats, tried in order.
    pub date_formats: Vec<String>,
    /// Identifying key columns for duplicate detection. Empty means the
    /// first column.
    pub key_columns: Vec<String>,
    /// Fallback policy for conflicting duplicates.
    pub conflict_policy: ConflictPolicy,
    /// Abort the run when a column fails type consistency.
    pub strict_types: bool,
    /// Re-impute cells the normalizer demoted to missing.
    pub reimpute_demoted: bool,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            casing: CaseRule::default(),
            missing_threshold: 0.5,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect(),
            key_columns: Vec::new(),
            conflict_policy: ConflictPolicy::default(),
            strict_types: false,
            reimpute_demoted: true,
        }
    }
}

impl CleanConfig {
    /// Key column indices for a table, defaulting to the first column.
    /// Unknown names are skipped; `resolve_key_indices` reports them.
    pub(crate) fn key_indices(&self, table: &Table) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .key_columns
            .iter()
            .filter_map(|name| table.column_index(name))
            .collect();
        if indices.is_empty() {
            indices.push(0);
        }
        indices
    }

    /// Key column indices, failing on a configured name the table lacks.
    fn resolve_key_indices(&self, table: &Table) -> Result<Vec<usize>> {
        for name in &self.key_columns {
            if table.column_index(name).is_none() {
                return Err(RefineError::UnknownColumn(name.clone()));
            }
        }
        Ok(self.key_indices(table))
    }
}

/// The data-cleaning engine.
///
/// Owns the working table and the operation log for the duration of one
/// run and is the only component that may short-circuit the pipeline.
pub struct DataRefine {
    config: CleanConfig,
    resolver: Option<Arc<dyn ConflictResolver>>,
}

impl DataRefine {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(CleanConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(config: CleanConfig) -> Self {
        Self {
            config,
            resolver: None,
        }
    }

    /// Install a conflict resolver.
    ///
    /// The resolver is consulted for every conflicting duplicate pair;
    /// the external collaborator may prompt a human and inject the
    /// choice. Conflicts it declines to decide stay unresolved.
    pub fn with_resolver(mut self, resolver: impl ConflictResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &CleanConfig {
        &self.config
    }

    /// Validate a table without cleaning it.
    pub fn validate(&self, table: &Table) -> ValidationResult {
        SchemaValidator::new().validate(table, &self.config)
    }

    /// Run the full cleaning pipeline: validate, impute, deduplicate,
    /// normalize, and assemble the report.
    ///
    /// A structural failure (or a type mismatch under `strict_types`)
    /// returns [`RefineError::Validation`] and exposes no partial table.
    pub fn clean(&self, table: Table) -> Result<CleaningReport> {
        let validation = self.validate(&table);
        if !validation.passed {
            return Err(RefineError::Validation(ValidationFailure {
                issues: validation.issues,
            }));
        }
        if self.config.strict_types && validation.has_kind(IssueKind::TypeError) {
            return Err(RefineError::Validation(ValidationFailure {
                issues: validation.issues,
            }));
        }

        let key_indices = self.config.resolve_key_indices(&table)?;

        let mut table = table;
        let mut issues = validation.issues;
        let mut log = vec![OperationLogEntry::new(
            Stage::Validation,
            "schema validation",
            format!("passed with {} issue(s)", issues.len()),
        )];

        let rows_before = table.row_count();
        let columns = table.column_count();

        // Missingness per row, captured before imputation: the duplicate
        // resolver's default policy prefers originally-complete rows.
        let original_missing: Vec<usize> = (0..rows_before)
            .map(|row| table.row_missing_count(row))
            .collect();

        let imputer = Imputer::new();
        log.extend(imputer.impute(&mut table));

        let mut dedupe = DuplicateResolver::new(key_indices);
        if let Some(ref resolver) = self.resolver {
            dedupe = dedupe.with_resolver(resolver.as_ref());
        } else if self.config.conflict_policy == ConflictPolicy::Manual {
            dedupe = dedupe.without_default_policy();
        }
        let (dedupe_log, conflicts) = dedupe.resolve(&mut table, &original_missing);
        log.extend(dedupe_log);

        // Columns the validator flagged as wholesale type mismatches are
        // not normalized.
        let blocked: Vec<usize> = issues
            .iter()
            .filter(|i| i.kind == IssueKind::TypeError)
            .filter_map(|i| i.column.as_deref().and_then(|n| table.column_index(n)))
            .collect();
        let normalizer = Normalizer::new();
        let (normalize_log, demoted) =
            normalizer.normalize(&mut table, &self.config, &blocked, &mut issues);
        log.extend(normalize_log);

        if self.config.reimpute_demoted && !demoted.is_empty() {
            log.extend(imputer.impute_cells(&mut table, &demoted));
        }

        for conflict in &conflicts {
            if conflict.resolution == ConflictResolution::Unresolved {
                issues.push(
                    Issue::new(
                        IssueKind::ConflictWarning,
                        format!(
                            "key '{}': rows {} and {} disagree on {:?}; left unresolved",
                            conflict.key,
                            conflict.first_row,
                            conflict.second_row,
                            conflict.differing_columns
                        ),
                    )
                    .with_row(conflict.first_row),
                );
            }
        }

        let summary = self.summarize(&table, rows_before, columns, &log, &conflicts, &issues);

        Ok(CleaningReport {
            table,
            log,
            issues,
            conflicts,
            summary,
        })
    }

    fn summarize(
        &self,
        table: &Table,
        rows_before: usize,
        columns: usize,
        log: &[OperationLogEntry],
        conflicts: &[crate::report::ConflictRecord],
        issues: &[Issue],
    ) -> CleaningSummary {
        let numeric_rules = ["linear interpolation", "mean imputation", "sentinel fill"];
        let numeric_cells_imputed = log
            .iter()
            .filter(|e| e.stage == Stage::Imputation && numeric_rules.contains(&e.rule.as_str()))
            .count();
        let categorical_cells_imputed = log
            .iter()
            .filter(|e| {
                e.stage == Stage::Imputation
                    && !numeric_rules.contains(&e.rule.as_str())
                    && e.row.is_some()
            })
            .count();
        let duplicates_removed = log
            .iter()
            .filter(|e| e.rule == "exact duplicate removal")
            .count();
        let cells_normalized = log.iter().filter(|e| e.stage == Stage::Normalization).count();

        let conflicts_unresolved = conflicts
            .iter()
            .filter(|c| c.resolution == ConflictResolution::Unresolved)
            .count();
        let conflicts_resolved = conflicts.len() - conflicts_unresolved;

        let mut counts = IssueCounts::default();
        for issue in issues {
            match issue.severity {
                Severity::Error => counts.error += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Info => counts.info += 1,
            }
        }

        CleaningSummary {
            rows_before,
            rows_after: table.row_count(),
            columns,
            numeric_cells_imputed,
            categorical_cells_imputed,
            duplicates_removed,
            conflicts_resolved,
            conflicts_unresolved,
            cells_normalized,
            issues: counts,
        }
    }
}

impl Default for DataRefine {
    fn default() -> Self {
        Self::new()
    }
}
