//! CSV parsing: line tokenizer, header-keyed record loader and typed row
//! decoders for every dataset.

pub mod csv_line;
pub mod records;
pub mod rows;

#[cfg(test)]
mod csv_parser_tests;

use chrono::NaiveDate;

pub use csv_line::{format_line, parse_line};
pub use records::{load_records, load_records_strict, Record, RecordSet};
pub use rows::{
    attendance_from_records, classes_taught_from_records, indicators_from_records,
    management_cycle_from_records, schools_from_records, subjects_in,
    technical_visits_from_records,
};

/// Errors raised by the strict loading paths.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: expected {expected} fields, found {found}")]
    RowShape {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("CSV content has no header line")]
    MissingHeader,

    #[error("invalid date '{value}' (expected dd/mm/yyyy or yyyy-mm-dd)")]
    InvalidDate { value: String },
}

/// Parse a date given by a caller (config, request), rejecting blank or
/// malformed values instead of treating them as undated.
pub fn parse_date_strict(value: &str) -> Result<NaiveDate, ParseError> {
    crate::models::parse_date(value).ok_or_else(|| ParseError::InvalidDate {
        value: value.to_string(),
    })
}
