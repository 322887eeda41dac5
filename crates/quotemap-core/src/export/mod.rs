pub mod delimited;
pub mod spreadsheet;

use indexmap::IndexSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::QuoteMapError;
use crate::mapping::outcome::Record;

/// Output format of the Export Adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Spreadsheet,
    DelimitedText,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Spreadsheet => write!(f, "xlsx"),
            ExportFormat::DelimitedText => write!(f, "csv"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = QuoteMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "spreadsheet" | "excel" => Ok(ExportFormat::Spreadsheet),
            "csv" | "delimited-text" => Ok(ExportFormat::DelimitedText),
            other => Err(QuoteMapError::UnsupportedFormat(format!(
                "{other} (export supports xlsx and csv)"
            ))),
        }
    }
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self, QuoteMapError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                QuoteMapError::UnsupportedFormat(format!("{} (no file extension)", path.display()))
            })?;
        ext.parse()
    }
}

/// Union of record keys in first-seen order.
pub fn collect_columns(records: &[Record]) -> Vec<String> {
    let mut columns: IndexSet<&str> = IndexSet::new();
    for record in records {
        columns.extend(record.keys().map(String::as_str));
    }
    columns.into_iter().map(str::to_string).collect()
}

/// Serialize records to bytes; columns are the union of their keys.
pub fn export_records(records: &[Record], format: ExportFormat) -> Result<Vec<u8>, QuoteMapError> {
    export_table(&collect_columns(records), records, format)
}

/// Serialize records under an explicit column list (e.g. a template's field names).
///
/// Keys missing from a record are written as empty cells; keys not in `columns`
/// are not written. Values are written as stored, without re-coercion.
pub fn export_table(
    columns: &[String],
    records: &[Record],
    format: ExportFormat,
) -> Result<Vec<u8>, QuoteMapError> {
    let bytes = match format {
        ExportFormat::Spreadsheet => spreadsheet::write_xlsx(columns, records)?,
        ExportFormat::DelimitedText => delimited::write_csv(columns, records)?,
    };
    tracing::debug!(
        %format,
        records = records.len(),
        columns = columns.len(),
        bytes = bytes.len(),
        "exported records"
    );
    Ok(bytes)
}

/// Export records to a file, choosing the format from its extension.
pub fn export_to_path(records: &[Record], path: &Path) -> Result<(), QuoteMapError> {
    let format = ExportFormat::from_path(path)?;
    let bytes = export_records(records, format)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
