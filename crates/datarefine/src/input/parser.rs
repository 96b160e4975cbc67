//! CSV/JSON parser with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{RefineError, Result};
use crate::table::{Column, ColumnType, Table};

use super::infer::{infer_column_type, typed_cell, CATEGORICAL_THRESHOLD, DEFAULT_DATE_FORMATS};
use super::source::SourceMetadata;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Accepted date input formats for type inference.
    pub date_formats: Vec<String>,
    /// Maximum distinct values for a string column to infer categorical.
    pub categorical_threshold: usize,
    /// Declared column types, overriding inference by column name.
    pub declared_types: IndexMap<String, ColumnType>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            max_rows: None,
            quote: b'"',
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|s| s.to_string()).collect(),
            categorical_threshold: CATEGORICAL_THRESHOLD,
            declared_types: IndexMap::new(),
        }
    }
}

/// Parses tabular data into typed tables.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a file and return the typed table and source metadata.
    ///
    /// JSON files (an array of flat objects) are recognized by their
    /// leading `[`; everything else goes through delimiter detection.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Table, SourceMetadata)> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| RefineError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let size_bytes = file
            .metadata()
            .map_err(|e| RefineError::Io {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| RefineError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let (table, format) = if looks_like_json(&contents) {
            let text = std::str::from_utf8(&contents)
                .map_err(|_| RefineError::EmptyData("file is not valid UTF-8".to_string()))?;
            (self.from_json_str(text)?, "json".to_string())
        } else {
            let delimiter = match self.config.delimiter {
                Some(d) => d,
                None => detect_delimiter(&contents)?,
            };
            let format = match delimiter {
                b'\t' => "tsv",
                b',' => "csv",
                b';' => "csv-semicolon",
                b'|' => "psv",
                _ => "delimited",
            }
            .to_string();
            (self.parse_csv_bytes(&contents, delimiter)?, format)
        };

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            hash,
            size_bytes,
            format,
            table.row_count(),
            table.column_count(),
        );

        Ok((table, metadata))
    }

    /// Parse CSV text with delimiter auto-detection.
    pub fn from_csv_str(&self, data: &str) -> Result<Table> {
        let bytes = data.as_bytes();
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };
        self.parse_csv_bytes(bytes, delimiter)
    }

    /// Parse a JSON array of flat objects. The first object's key order
    /// defines column order; absent keys become missing cells.
    pub fn from_json_str(&self, data: &str) -> Result<Table> {
        let value: Value = serde_json::from_str(data)?;
        let records = value
            .as_array()
            .ok_or_else(|| RefineError::EmptyData("expected a JSON array of objects".to_string()))?;
        if records.is_empty() {
            return Err(RefineError::EmptyData("no data rows found".to_string()));
        }

        let mut headers: Vec<String> = Vec::new();
        for record in records {
            let object = record.as_object().ok_or_else(|| {
                RefineError::EmptyData("expected every JSON element to be an object".to_string())
            })?;
            for key in object.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }

        let mut rows: Vec<Vec<String>> = Vec::with_capacity(records.len());
        for record in records {
            let object = record.as_object().expect("checked above");
            let row: Vec<String> = headers
                .iter()
                .map(|h| object.get(h).map(json_literal).unwrap_or_default())
                .collect();
            rows.push(row);
        }

        self.build_table(headers, rows)
    }

    /// Parse CSV bytes with a known delimiter.
    fn parse_csv_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        if headers.is_empty() {
            return Err(RefineError::EmptyData("no columns found".to_string()));
        }

        let expected_cols = headers.len();
        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }
            let record = result?;
            let mut row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
            while row.len() < expected_cols {
                row.push(String::new());
            }
            row.truncate(expected_cols);
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(RefineError::EmptyData("no data rows found".to_string()));
        }

        self.build_table(headers, rows)
    }

    /// Infer column types and build a typed table from raw literals.
    fn build_table(&self, headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Table> {
        let mut columns = Vec::with_capacity(headers.len());
        for (col_idx, name) in headers.into_iter().enumerate() {
            let literals: Vec<&str> = rows.iter().map(|r| r[col_idx].as_str()).collect();
            let column_type = match self.config.declared_types.get(&name) {
                Some(&declared) => declared,
                None => infer_column_type(
                    &literals,
                    &self.config.date_formats,
                    self.config.categorical_threshold,
                ),
            };
            let cells = literals
                .iter()
                .map(|raw| typed_cell(raw, column_type))
                .collect();
            columns.push(Column::new(name, column_type, cells));
        }
        Table::new(columns)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if the contents look like a JSON document rather than delimited text.
fn looks_like_json(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'[')
}

/// Render a JSON value as a raw cell literal.
fn json_literal(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(RefineError::EmptyData("no lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // Consistent counts across lines beat raw frequency; tab gets a
        // slight bonus since it rarely appears inside actual data.
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_parse_csv_with_types() {
        let parser = Parser::new();
        let table = parser
            .from_csv_str("name,age,joined\nAlice,30,2024-01-05\nBob,NA,2024-02-10\n")
            .unwrap();

        assert_eq!(table.headers(), vec!["name", "age", "joined"]);
        assert_eq!(table.column(1).unwrap().column_type, ColumnType::Numeric);
        assert_eq!(table.column(2).unwrap().column_type, ColumnType::Date);
        assert_eq!(table.cell(0, 1), Some(&Cell::Number(30.0)));
        assert_eq!(table.cell(1, 1), Some(&Cell::Missing));
    }

    #[test]
    fn test_parse_csv_short_rows_padded() {
        let parser = Parser::new();
        let table = parser.from_csv_str("a,b\n1,2\n3\n").unwrap();
        assert_eq!(table.cell(1, 1), Some(&Cell::Missing));
    }

    #[test]
    fn test_parse_json_records() {
        let parser = Parser::new();
        let table = parser
            .from_json_str(r#"[{"id": 1, "city": "NY"}, {"id": 2, "city": null}]"#)
            .unwrap();

        assert_eq!(table.headers(), vec!["id", "city"]);
        assert_eq!(table.cell(0, 0), Some(&Cell::Number(1.0)));
        assert_eq!(table.cell(1, 1), Some(&Cell::Missing));
    }

    #[test]
    fn test_parse_empty_fails() {
        let parser = Parser::new();
        assert!(parser.from_csv_str("a,b\n").is_err());
        assert!(parser.from_json_str("[]").is_err());
    }

    #[test]
    fn test_declared_type_overrides_inference() {
        let mut config = ParserConfig::default();
        config
            .declared_types
            .insert("zip".to_string(), ColumnType::Text);
        let parser = Parser::with_config(config);
        let table = parser.from_csv_str("zip\n02134\n10001\n").unwrap();
        assert_eq!(table.column(0).unwrap().column_type, ColumnType::Text);
        assert_eq!(table.cell(0, 0), Some(&Cell::Text("02134".to_string())));
    }
}
