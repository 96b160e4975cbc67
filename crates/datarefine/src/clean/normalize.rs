//! Type normalization: casing, date canonicalization, numeric coercion.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::input::{parse_date, strip_numeric_decoration};
use crate::refine::CleanConfig;
use crate::report::{OperationLogEntry, Stage};
use crate::table::{Cell, ColumnType, Table};
use crate::validate::{Issue, IssueKind};

/// Casing rule for text and categorical columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseRule {
    /// Lowercase everything.
    Lower,
    /// Uppercase everything.
    Upper,
    /// Title-case every word.
    Title,
    /// Leave a column alone when its casing is already internally
    /// consistent; title-case it when it is not.
    #[default]
    PreserveConsistent,
}

/// Canonicalizes cell representations in place.
///
/// Columns flagged with a type mismatch by the validator are skipped
/// entirely; their indices arrive in `blocked`.
pub struct Normalizer;

impl Normalizer {
    /// Create a new normalizer.
    pub fn new() -> Self {
        Self
    }

    /// Normalize the table. Returns the log entries and the cells that
    /// were demoted to missing for re-imputation (column, row).
    pub fn normalize(
        &self,
        table: &mut Table,
        config: &CleanConfig,
        blocked: &[usize],
        issues: &mut Vec<Issue>,
    ) -> (Vec<OperationLogEntry>, Vec<(usize, usize)>) {
        let mut log = Vec::new();
        let mut demoted = Vec::new();

        for col_idx in 0..table.column_count() {
            if blocked.contains(&col_idx) {
                continue;
            }
            match table.columns()[col_idx].column_type {
                ColumnType::Categorical | ColumnType::Text => {
                    self.normalize_text(table, col_idx, config, &mut log)
                }
                ColumnType::Date => {
                    self.normalize_dates(table, col_idx, config, &mut log, &mut demoted, issues)
                }
                ColumnType::Numeric => {
                    self.normalize_numbers(table, col_idx, config, &mut log, &mut demoted, issues)
                }
            }
        }

        (log, demoted)
    }

    fn normalize_text(
        &self,
        table: &mut Table,
        col_idx: usize,
        config: &CleanConfig,
        log: &mut Vec<OperationLogEntry>,
    ) {
        let column = &table.columns()[col_idx];
        let name = column.name.clone();

        let recase = match config.casing {
            CaseRule::Lower | CaseRule::Upper | CaseRule::Title => Some(config.casing),
            CaseRule::PreserveConsistent => {
                if casing_is_consistent(column.cells.iter()) {
                    None
                } else {
                    Some(CaseRule::Title)
                }
            }
        };

        for row in 0..table.row_count() {
            let Some(Cell::Text(original)) = table.cell(row, col_idx).cloned() else {
                continue;
            };
            let trimmed = original.trim();
            let normalized = match recase {
                Some(rule) => apply_case(trimmed, rule),
                None => trimmed.to_string(),
            };
            if normalized == original {
                continue;
            }

            let explanation = if normalized == trimmed {
                "trimmed surrounding whitespace".to_string()
            } else {
                format!("applied {} casing", case_label(recase.expect("recased")))
            };
            table.set_cell(row, col_idx, Cell::Text(normalized.clone()));
            log.push(
                OperationLogEntry::new(Stage::Normalization, "text normalization", explanation)
                    .with_column(&name)
                    .with_row(row)
                    .with_before(original)
                    .with_after(normalized),
            );
        }
    }

    fn normalize_dates(
        &self,
        table: &mut Table,
        col_idx: usize,
        config: &CleanConfig,
        log: &mut Vec<OperationLogEntry>,
        demoted: &mut Vec<(usize, usize)>,
        issues: &mut Vec<Issue>,
    ) {
        let name = table.columns()[col_idx].name.clone();

        for row in 0..table.row_count() {
            let Some(Cell::Text(original)) = table.cell(row, col_idx).cloned() else {
                continue;
            };
            match parse_date(&original, &config.date_formats) {
                Some(date) => {
                    table.set_cell(row, col_idx, Cell::Date(date));
                    log.push(
                        OperationLogEntry::new(
                            Stage::Normalization,
                            "date canonicalization",
                            "reformatted to YYYY-MM-DD",
                        )
                        .with_column(&name)
                        .with_row(row)
                        .with_before(original)
                        .with_after(date.to_string()),
                    );
                }
                None => {
                    issues.push(
                        Issue::new(
                            IssueKind::FormatError,
                            format!("unparsable date '{}'", original.trim()),
                        )
                        .with_column(&name)
                        .with_row(row),
                    );
                    if config.reimpute_demoted {
                        table.set_cell(row, col_idx, Cell::Missing);
                        demoted.push((col_idx, row));
                        log.push(
                            OperationLogEntry::new(
                                Stage::Normalization,
                                "format correction",
                                "unparsable date demoted to missing for re-imputation",
                            )
                            .with_column(&name)
                            .with_row(row)
                            .with_before(original),
                        );
                    }
                }
            }
        }
    }

    fn normalize_numbers(
        &self,
        table: &mut Table,
        col_idx: usize,
        config: &CleanConfig,
        log: &mut Vec<OperationLogEntry>,
        demoted: &mut Vec<(usize, usize)>,
        issues: &mut Vec<Issue>,
    ) {
        let name = table.columns()[col_idx].name.clone();

        for row in 0..table.row_count() {
            let Some(Cell::Text(original)) = table.cell(row, col_idx).cloned() else {
                continue;
            };
            match strip_numeric_decoration(&original) {
                Some(value) => {
                    table.set_cell(row, col_idx, Cell::Number(value));
                    log.push(
                        OperationLogEntry::new(
                            Stage::Normalization,
                            "numeric coercion",
                            "stripped formatting decoration",
                        )
                        .with_column(&name)
                        .with_row(row)
                        .with_before(original)
                        .with_after(Cell::Number(value).to_string()),
                    );
                }
                None => {
                    issues.push(
                        Issue::new(
                            IssueKind::FormatError,
                            format!("unparsable numeric value '{}'", original.trim()),
                        )
                        .with_column(&name)
                        .with_row(row),
                    );
                    if config.reimpute_demoted {
                        table.set_cell(row, col_idx, Cell::Missing);
                        demoted.push((col_idx, row));
                        log.push(
                            OperationLogEntry::new(
                                Stage::Normalization,
                                "format correction",
                                "unparsable number demoted to missing for re-imputation",
                            )
                            .with_column(&name)
                            .with_row(row)
                            .with_before(original),
                        );
                    }
                }
            }
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// True when no two values in the column differ only by case.
fn casing_is_consistent<'a>(cells: impl Iterator<Item = &'a Cell>) -> bool {
    let mut groups: IndexMap<String, &str> = IndexMap::new();
    for cell in cells {
        let Cell::Text(value) = cell else { continue };
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        match groups.get(&trimmed.to_lowercase()) {
            Some(&variant) if variant != trimmed => return false,
            Some(_) => {}
            None => {
                groups.insert(trimmed.to_lowercase(), trimmed);
            }
        }
    }
    true
}

/// Apply a concrete casing rule to a value.
fn apply_case(value: &str, rule: CaseRule) -> String {
    match rule {
        CaseRule::Lower => value.to_lowercase(),
        CaseRule::Upper => value.to_uppercase(),
        CaseRule::Title | CaseRule::PreserveConsistent => title_case(value),
    }
}

/// Uppercase the first letter of each word, lowercase the rest. Inner
/// whitespace is preserved as-is.
fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            out.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

fn case_label(rule: CaseRule) -> &'static str {
    match rule {
        CaseRule::Lower => "lower",
        CaseRule::Upper => "upper",
        CaseRule::Title | CaseRule::PreserveConsistent => "title",
    }
}
