use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::QuoteMapError;
use crate::mapping::locator::index_to_column;

/// Key under which a free-text document exposes its full text.
pub const TEXT_FIELD: &str = "text";

/// Shape of an uploaded document, and of the documents a template expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    #[serde(alias = "excel", alias = "xlsx", alias = "xls")]
    Spreadsheet,
    #[serde(alias = "delimited", alias = "csv", alias = "tsv")]
    DelimitedText,
    #[serde(alias = "pdf", alias = "text", alias = "txt")]
    FreeText,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Spreadsheet => "spreadsheet",
            SourceKind::DelimitedText => "delimited-text",
            SourceKind::FreeText => "free-text",
        };
        f.pad(name)
    }
}

impl FromStr for SourceKind {
    type Err = QuoteMapError;

    /// Parse a declared kind, accepting the short names uploads use.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spreadsheet" | "excel" | "xlsx" | "xls" => Ok(SourceKind::Spreadsheet),
            "delimited-text" | "delimited" | "csv" | "tsv" => Ok(SourceKind::DelimitedText),
            "free-text" | "pdf" | "text" | "txt" => Ok(SourceKind::FreeText),
            other => Err(QuoteMapError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl SourceKind {
    /// Detect the kind from a file extension.
    pub fn from_path(path: &Path) -> Result<SourceKind, QuoteMapError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceKind::Spreadsheet),
            "csv" | "tsv" => Ok(SourceKind::DelimitedText),
            "pdf" | "txt" => Ok(SourceKind::FreeText),
            "" => Err(QuoteMapError::UnsupportedFormat(format!(
                "{} (no file extension)",
                path.display()
            ))),
            other => Err(QuoteMapError::UnsupportedFormat(format!(".{other}"))),
        }
    }

    pub fn is_tabular(&self) -> bool {
        !matches!(self, SourceKind::FreeText)
    }
}

/// A raw cell or field value as it came out of the document, before coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Empty cells and whitespace-only text carry no value.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// First sheet of a workbook as a raw, position-indexed grid anchored at A1.
#[derive(Debug, Clone, Serialize)]
pub struct SheetGrid {
    /// Column letters for the grid width (`A`, `B`, ...). Row 0 is not treated as a header.
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let headers = (0..width).map(index_to_column).collect();
        SheetGrid { headers, rows }
    }
}

/// A delimited-text table: one record per data line, keyed by header name.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelimitedTable {
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, CellValue>>,
    /// 1-based line number of each record, counting the header line as line 1.
    #[serde(skip)]
    pub line_numbers: Vec<usize>,
}

/// Full text of a free-text document (PDF or plain text).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDocument {
    pub text: String,
    pub page_count: usize,
}

/// Uniform in-memory representation of a parsed upload, tagged by kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "sourceKind", rename_all = "kebab-case")]
pub enum NormalizedDocument {
    Spreadsheet(SheetGrid),
    DelimitedText(DelimitedTable),
    FreeText(TextDocument),
}

impl NormalizedDocument {
    pub fn source_kind(&self) -> SourceKind {
        match self {
            NormalizedDocument::Spreadsheet(_) => SourceKind::Spreadsheet,
            NormalizedDocument::DelimitedText(_) => SourceKind::DelimitedText,
            NormalizedDocument::FreeText(_) => SourceKind::FreeText,
        }
    }

    pub fn headers(&self) -> Vec<String> {
        match self {
            NormalizedDocument::Spreadsheet(grid) => grid.headers.clone(),
            NormalizedDocument::DelimitedText(table) => table.headers.clone(),
            NormalizedDocument::FreeText(_) => vec![TEXT_FIELD.to_string()],
        }
    }

    /// Number of rows; a free-text document is a single pseudo-row.
    pub fn row_count(&self) -> usize {
        match self {
            NormalizedDocument::Spreadsheet(grid) => grid.rows.len(),
            NormalizedDocument::DelimitedText(table) => table.rows.len(),
            NormalizedDocument::FreeText(_) => 1,
        }
    }
}
