use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::coercion::FieldValue;

/// One mapped record: field name to coerced value, in mapping order.
pub type Record = IndexMap<String, FieldValue>;

/// A recoverable failure that excludes one row from the mapped output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowError {
    /// 1-based position among the rows considered (after skipped rows).
    pub row: usize,
    /// 1-based row or line number in the source document.
    pub source_row: usize,
    /// Field the error concerns.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.message)
    }
}

/// What one row produced. A row is mapped only when `errors` is empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowOutcome {
    pub fields: Record,
    pub errors: Vec<RowError>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionTotals {
    pub total_rows: usize,
    pub mapped_rows: usize,
    pub error_rows: usize,
}

/// Outcome of applying a template to one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Destination field names in mapping order.
    pub result_headers: Vec<String>,
    pub mapped_rows: Vec<Record>,
    pub row_errors: Vec<RowError>,
    pub totals: ExtractionTotals,
}

impl ExtractionResult {
    /// Errors grouped by row number, in row order.
    pub fn errors_by_row(&self) -> Vec<(usize, Vec<&RowError>)> {
        let mut grouped: Vec<(usize, Vec<&RowError>)> = Vec::new();
        for err in &self.row_errors {
            match grouped.last_mut() {
                Some((row, errs)) if *row == err.row => errs.push(err),
                _ => grouped.push((err.row, vec![err])),
            }
        }
        grouped
    }
}
