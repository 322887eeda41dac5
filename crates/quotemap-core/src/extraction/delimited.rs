use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::QuoteMapError;
use crate::model::{CellValue, DelimitedTable, SourceKind};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse UTF-8 delimited text. The first non-blank line is the header.
///
/// Values are kept as text; typing happens at coercion time.
pub fn parse_delimited(bytes: &[u8], delimiter: u8) -> Result<DelimitedTable, QuoteMapError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)
        .map_err(|e| parse_failure(format!("input is not valid UTF-8: {e}")))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    // Physical line of the header; record lines are rebased so the header is line 1.
    let mut header_line = 1usize;
    let mut rows = Vec::new();
    let mut line_numbers = Vec::new();
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| parse_failure(e.to_string()))?;
        if is_blank_record(&record) {
            skipped += 1;
            continue;
        }
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        match &headers {
            None => {
                headers = Some(record.iter().map(str::to_string).collect());
                header_line = line;
            }
            Some(names) => {
                rows.push(record_to_row(names, &record));
                line_numbers.push(line.saturating_sub(header_line) + 1);
            }
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "skipped blank delimited records");
    }

    Ok(DelimitedTable {
        headers: headers.unwrap_or_default(),
        rows,
        line_numbers,
    })
}

fn is_blank_record(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

/// Key fields by header name. Fields past the header width are dropped and
/// a repeated header keeps its first column.
fn record_to_row(headers: &[String], record: &StringRecord) -> HashMap<String, CellValue> {
    let mut row = HashMap::new();
    for (name, value) in headers.iter().zip(record.iter()) {
        if name.is_empty() {
            continue;
        }
        let cell = if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        };
        row.entry(name.clone()).or_insert(cell);
    }
    row
}

fn parse_failure(reason: String) -> QuoteMapError {
    QuoteMapError::ParseFailure {
        kind: SourceKind::DelimitedText,
        reason,
    }
}
