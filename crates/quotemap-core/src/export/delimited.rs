use csv::Writer;

use crate::error::QuoteMapError;
use crate::mapping::outcome::Record;

/// Write records as CSV with one header line, even when there are no records.
pub fn write_csv(columns: &[String], records: &[Record]) -> Result<Vec<u8>, QuoteMapError> {
    if columns.is_empty() {
        return Ok(b"\n".to_vec());
    }

    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(columns).map_err(csv_error)?;
    for record in records {
        let fields = columns
            .iter()
            .map(|name| record.get(name).map(|v| v.to_string()).unwrap_or_default());
        writer.write_record(fields).map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|e| QuoteMapError::Export(e.to_string()))
}

fn csv_error(e: csv::Error) -> QuoteMapError {
    QuoteMapError::Export(e.to_string())
}
