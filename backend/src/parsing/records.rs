//! Header-keyed record loading.
//!
//! Values stay raw strings at this layer; typed coercion happens in
//! [`crate::parsing::rows`] through the lenient accessors on [`Record`].

use std::collections::HashMap;
use std::sync::Arc;

use super::csv_line::parse_line;
use super::ParseError;

/// One data line zipped against the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    index: Arc<HashMap<String, usize>>,
    values: Vec<String>,
}

impl Record {
    /// Raw value of `column`, or `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.index
            .get(column)
            .and_then(|&i| self.values.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn text(&self, column: &str) -> String {
        self.get(column).to_string()
    }

    /// Non-negative integer with `parseInt`-like leniency: leading digits are
    /// used, anything else (blank, negative, non-numeric) is zero.
    pub fn count(&self, column: &str) -> u64 {
        parse_count(self.get(column))
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        parse_number(self.get(column))
    }

    pub fn flag(&self, column: &str) -> bool {
        parse_flag(self.get(column))
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    /// Header names known to this record, in no particular order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }
}

pub fn parse_count(cell: &str) -> u64 {
    let cell = cell.trim();
    let digits: &str = cell.strip_prefix('+').unwrap_or(cell);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().unwrap_or(0)
}

/// Decimal number; a comma decimal separator is accepted.
pub fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>()
        .or_else(|_| cell.replace(',', ".").parse::<f64>())
        .ok()
        .filter(|v| v.is_finite())
}

pub fn parse_flag(cell: &str) -> bool {
    matches!(
        cell.trim().to_lowercase().as_str(),
        "true" | "1" | "sim" | "s" | "yes"
    )
}

/// Parsed CSV content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
    /// 1-based line numbers of rows dropped for a field-count mismatch
    pub dropped_lines: Vec<usize>,
}

impl RecordSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Columns from `required` absent from the header.
    pub fn missing_columns<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|c| !self.has_column(c))
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

/// Non-blank lines with their 1-based line numbers.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.trim_start_matches('\u{feff}')
        .split('\n')
        .enumerate()
        .map(|(i, line)| (i + 1, line.strip_suffix('\r').unwrap_or(line)))
        .filter(|(_, line)| !line.trim().is_empty())
}

fn header_index(headers: &[String]) -> Arc<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(headers.len());
    for (i, header) in headers.iter().enumerate() {
        // First occurrence wins on duplicated headers
        index.entry(header.clone()).or_insert(i);
    }
    Arc::new(index)
}

fn load(text: &str, strict: bool) -> Result<RecordSet, ParseError> {
    let mut lines = content_lines(text);
    let Some((_, header_line)) = lines.next() else {
        if strict {
            return Err(ParseError::MissingHeader);
        }
        return Ok(RecordSet::empty());
    };

    let headers: Vec<String> = parse_line(header_line)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();
    let index = header_index(&headers);

    let mut records = Vec::new();
    let mut dropped_lines = Vec::new();
    for (line_number, line) in lines {
        let values = parse_line(line);
        if values.len() != headers.len() {
            if strict {
                return Err(ParseError::RowShape {
                    line: line_number,
                    expected: headers.len(),
                    found: values.len(),
                });
            }
            dropped_lines.push(line_number);
            continue;
        }
        records.push(Record {
            index: Arc::clone(&index),
            values,
        });
    }

    if !dropped_lines.is_empty() {
        log::warn!(
            "Dropped {} CSV row(s) with a field count different from the {}-column header (lines {:?})",
            dropped_lines.len(),
            headers.len(),
            dropped_lines
        );
    }

    Ok(RecordSet {
        headers,
        records,
        dropped_lines,
    })
}

/// Load CSV text, silently dropping rows whose field count differs from the
/// header. Dropped line numbers are kept on the result and logged.
pub fn load_records(text: &str) -> RecordSet {
    // Lenient mode never produces an error
    load(text, false).unwrap_or_default()
}

/// Load CSV text, failing on blank content or on the first row whose shape
/// differs from the header.
pub fn load_records_strict(text: &str) -> Result<RecordSet, ParseError> {
    load(text, true)
}
