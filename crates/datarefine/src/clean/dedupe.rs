//! Duplicate detection and resolution.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::report::{ConflictChoice, ConflictRecord, ConflictResolution, OperationLogEntry, Stage};
use crate::table::Table;

/// Caller-supplied conflict resolution.
///
/// The external collaborator may prompt a human and inject the choice;
/// the engine only ever sees a synchronous callback. Returning `None`
/// leaves both rows in place, flagged as unresolved.
pub trait ConflictResolver: Send + Sync {
    /// Decide what to do with a conflicting duplicate pair.
    fn resolve(&self, conflict: &ConflictRecord, table: &Table) -> Option<ConflictChoice>;
}

impl<F> ConflictResolver for F
where
    F: Fn(&ConflictRecord, &Table) -> Option<ConflictChoice> + Send + Sync,
{
    fn resolve(&self, conflict: &ConflictRecord, table: &Table) -> Option<ConflictChoice> {
        self(conflict, table)
    }
}

/// Collapses exact duplicates and resolves or flags conflicting ones.
pub struct DuplicateResolver<'a> {
    key_indices: Vec<usize>,
    resolver: Option<&'a dyn ConflictResolver>,
    use_default_policy: bool,
}

impl<'a> DuplicateResolver<'a> {
    /// Create a resolver keyed on the given column indices.
    pub fn new(key_indices: Vec<usize>) -> Self {
        Self {
            key_indices,
            resolver: None,
            use_default_policy: true,
        }
    }

    /// Install a caller-supplied resolver, consulted before the default
    /// policy.
    pub fn with_resolver(mut self, resolver: &'a dyn ConflictResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Disable the deterministic fallback policy. Conflicts the caller's
    /// resolver does not decide stay unresolved.
    pub fn without_default_policy(mut self) -> Self {
        self.use_default_policy = false;
        self
    }

    /// Deduplicate in place.
    ///
    /// `original_missing` holds the per-row count of missing cells as
    /// captured before imputation; the default policy prefers the row
    /// that was more complete originally.
    pub fn resolve(
        &self,
        table: &mut Table,
        original_missing: &[usize],
    ) -> (Vec<OperationLogEntry>, Vec<ConflictRecord>) {
        let mut log = Vec::new();
        let mut conflicts = Vec::new();
        let mut removed: Vec<usize> = Vec::new();

        let all_indices: Vec<usize> = (0..table.column_count()).collect();

        // Pass 1: exact duplicates collapse to the first occurrence.
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut survivors: Vec<usize> = Vec::new();
        for row in 0..table.row_count() {
            let full_key = table.row_key(row, &all_indices);
            match seen.get(&full_key) {
                Some(&first) => {
                    removed.push(row);
                    log.push(
                        OperationLogEntry::new(
                            Stage::Deduplication,
                            "exact duplicate removal",
                            format!("identical to row {}; collapsed to first occurrence", first),
                        )
                        .with_row(row),
                    );
                }
                None => {
                    seen.insert(full_key, row);
                    survivors.push(row);
                }
            }
        }

        // Pass 2: conflicting duplicates among the survivors.
        let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
        for &row in &survivors {
            groups
                .entry(table.row_key(row, &self.key_indices))
                .or_default()
                .push(row);
        }

        for rows in groups.values() {
            if rows.len() < 2 {
                continue;
            }
            let mut representative = rows[0];
            for &other in &rows[1..] {
                let differing: Vec<String> = table
                    .columns()
                    .iter()
                    .enumerate()
                    .filter(|(ci, _)| {
                        table.cell(representative, *ci) != table.cell(other, *ci)
                    })
                    .map(|(_, c)| c.name.clone())
                    .collect();
                if differing.is_empty() {
                    continue;
                }

                let key_display: Vec<String> = self
                    .key_indices
                    .iter()
                    .map(|&ci| {
                        table
                            .cell(representative, ci)
                            .map(|c| c.to_string())
                            .unwrap_or_default()
                    })
                    .collect();
                let mut record = ConflictRecord {
                    key: key_display.join("/"),
                    first_row: representative,
                    second_row: other,
                    differing_columns: differing,
                    first_candidate: table
                        .row(representative)
                        .map(|r| r.into_iter().cloned().collect())
                        .unwrap_or_default(),
                    second_candidate: table
                        .row(other)
                        .map(|r| r.into_iter().cloned().collect())
                        .unwrap_or_default(),
                    resolution: ConflictResolution::Unresolved,
                };

                let (choice, reason) = self.decide(&record, table, original_missing);
                match choice {
                    Some(ConflictChoice::KeepFirst) => {
                        record.resolution = ConflictResolution::KeptFirst;
                        removed.push(other);
                        log.push(
                            OperationLogEntry::new(
                                Stage::Deduplication,
                                "conflict resolution",
                                format!(
                                    "key '{}': kept row {} ({}); dropped row {}",
                                    record.key, representative, reason, other
                                ),
                            )
                            .with_row(other),
                        );
                    }
                    Some(ConflictChoice::KeepSecond) => {
                        record.resolution = ConflictResolution::KeptSecond;
                        removed.push(representative);
                        log.push(
                            OperationLogEntry::new(
                                Stage::Deduplication,
                                "conflict resolution",
                                format!(
                                    "key '{}': kept row {} ({}); dropped row {}",
                                    record.key, other, reason, representative
                                ),
                            )
                            .with_row(representative),
                        );
                        representative = other;
                    }
                    Some(ConflictChoice::KeepBoth) => {
                        record.resolution = ConflictResolution::KeptBoth;
                        log.push(
                            OperationLogEntry::new(
                                Stage::Deduplication,
                                "conflict resolution",
                                format!(
                                    "key '{}': kept both rows {} and {} ({})",
                                    record.key, representative, other, reason
                                ),
                            )
                            .with_row(other),
                        );
                    }
                    None => {
                        // Both rows stay; the orchestrator surfaces the
                        // record as an unresolved issue.
                    }
                }
                conflicts.push(record);
            }
        }

        table.remove_rows(&removed);
        (log, conflicts)
    }

    /// Pick a resolution: caller resolver first, then the deterministic
    /// default (fewer originally-missing fields, tie keeps the first).
    fn decide(
        &self,
        record: &ConflictRecord,
        table: &Table,
        original_missing: &[usize],
    ) -> (Option<ConflictChoice>, &'static str) {
        if let Some(resolver) = self.resolver {
            if let Some(choice) = resolver.resolve(record, table) {
                return (Some(choice), "caller decision");
            }
            return (None, "no caller decision");
        }
        if !self.use_default_policy {
            return (None, "no policy configured");
        }

        let first_missing = original_missing.get(record.first_row).copied().unwrap_or(0);
        let second_missing = original_missing.get(record.second_row).copied().unwrap_or(0);
        if second_missing < first_missing {
            (
                Some(ConflictChoice::KeepSecond),
                "fewer originally-missing fields",
            )
        } else if first_missing < second_missing {
            (
                Some(ConflictChoice::KeepFirst),
                "fewer originally-missing fields",
            )
        } else {
            (Some(ConflictChoice::KeepFirst), "first occurrence")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, Column, ColumnType};

    fn table_3x2(id: &[f64], amt: &[Cell]) -> Table {
        Table::new(vec![
            Column::new(
                "id",
                ColumnType::Numeric,
                id.iter().map(|&v| Cell::Number(v)).collect(),
            ),
            Column::new("amt", ColumnType::Numeric, amt.to_vec()),
        ])
        .unwrap()
    }

    #[test]
    fn test_exact_duplicates_collapse_to_first() {
        let mut table = table_3x2(
            &[1.0, 1.0, 2.0],
            &[Cell::Number(10.0), Cell::Number(10.0), Cell::Number(20.0)],
        );
        let (log, conflicts) =
            DuplicateResolver::new(vec![0]).resolve(&mut table, &[0, 0, 0]);

        assert_eq!(table.row_count(), 2);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].rule, "exact duplicate removal");
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_conflict_default_policy_prefers_complete_row() {
        // Row 0 originally had 1 missing field, row 1 none.
        let mut table = table_3x2(
            &[5.0, 5.0],
            &[Cell::Number(100.0), Cell::Number(200.0)],
        );
        let (log, conflicts) =
            DuplicateResolver::new(vec![0]).resolve(&mut table, &[1, 0]);

        assert_eq!(table.row_count(), 1);
        assert_eq!(table.cell(0, 1), Some(&Cell::Number(200.0)));
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].resolution, ConflictResolution::KeptSecond);
        assert_eq!(conflicts[0].differing_columns, vec!["amt".to_string()]);
        assert!(log[0].explanation.contains("fewer originally-missing"));
    }

    #[test]
    fn test_conflict_tie_keeps_first_occurrence() {
        let mut table = table_3x2(
            &[5.0, 5.0],
            &[Cell::Number(100.0), Cell::Number(200.0)],
        );
        let (_, conflicts) = DuplicateResolver::new(vec![0]).resolve(&mut table, &[0, 0]);

        assert_eq!(table.cell(0, 1), Some(&Cell::Number(100.0)));
        assert_eq!(conflicts[0].resolution, ConflictResolution::KeptFirst);
    }

    #[test]
    fn test_unresolved_conflict_keeps_both_rows() {
        let mut table = table_3x2(
            &[5.0, 5.0],
            &[Cell::Number(100.0), Cell::Number(200.0)],
        );
        let (log, conflicts) = DuplicateResolver::new(vec![0])
            .without_default_policy()
            .resolve(&mut table, &[0, 0]);

        assert_eq!(table.row_count(), 2);
        assert!(log.is_empty());
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].resolution, ConflictResolution::Unresolved);
    }

    #[test]
    fn test_caller_resolver_wins() {
        let mut table = table_3x2(
            &[5.0, 5.0],
            &[Cell::Number(100.0), Cell::Number(200.0)],
        );
        let pick_second =
            |_: &ConflictRecord, _: &Table| Some(ConflictChoice::KeepSecond);
        let (_, conflicts) = DuplicateResolver::new(vec![0])
            .with_resolver(&pick_second)
            .resolve(&mut table, &[0, 1]);

        // Default policy would keep the first row here; the caller wins.
        assert_eq!(table.cell(0, 1), Some(&Cell::Number(200.0)));
        assert_eq!(conflicts[0].resolution, ConflictResolution::KeptSecond);
    }
}
