use std::io::Cursor;

use calamine::{Data, DataType, Reader};

use crate::error::QuoteMapError;
use crate::model::{CellValue, SheetGrid, SourceKind};

/// Read the first sheet of a workbook into a raw grid anchored at cell A1.
///
/// Any format calamine detects (xlsx, xlsm, xlsb, xls, ods) is accepted. No row
/// is treated as a header; the grid's headers are the column letters.
pub fn parse_sheet(bytes: &[u8]) -> Result<SheetGrid, QuoteMapError> {
    let cursor = Cursor::new(bytes);
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor).map_err(|e| parse_failure(
        format!("failed to open workbook: {e}"),
    ))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| parse_failure("workbook has no sheets".into()))?
        .map_err(|e| parse_failure(format!("failed to read first sheet: {e}")))?;

    // Used range may start below/right of A1; pad so locators stay absolute.
    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<CellValue>> = (0..first_row).map(|_| Vec::new()).collect();
    for sheet_row in range.rows() {
        let mut row = vec![CellValue::Empty; first_col as usize];
        row.extend(sheet_row.iter().map(cell_value));
        while matches!(row.last(), Some(CellValue::Empty)) {
            row.pop();
        }
        rows.push(row);
    }

    let grid = SheetGrid::new(rows);
    tracing::debug!(
        rows = grid.rows.len(),
        columns = grid.headers.len(),
        "read first sheet"
    );
    Ok(grid)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Out-of-range serials stay numeric so coercion can report them.
        Data::DateTime(dt) => cell
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => cell
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}

fn parse_failure(reason: String) -> QuoteMapError {
    QuoteMapError::ParseFailure {
        kind: SourceKind::Spreadsheet,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    #[test]
    fn test_reads_typed_cells() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let date = ExcelDateTime::from_ymd(2024, 3, 1).unwrap();
        sheet.write_string(0, 0, "Quotation ID").unwrap();
        sheet.write_string(1, 0, "Q-001").unwrap();
        sheet.write_number(1, 1, 4200.5).unwrap();
        sheet.write_boolean(1, 2, true).unwrap();
        sheet.write_datetime_with_format(1, 3, &date, &date_format).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let grid = parse_sheet(&bytes).unwrap();
        assert_eq!(grid.headers, vec!["A", "B", "C", "D"]);
        assert_eq!(grid.rows.len(), 2);
        assert_eq!(grid.rows[1][0], CellValue::Text("Q-001".into()));
        assert_eq!(grid.rows[1][1], CellValue::Number(4200.5));
        assert_eq!(grid.rows[1][2], CellValue::Bool(true));
        match &grid.rows[1][3] {
            CellValue::DateTime(dt) => assert_eq!(dt.to_string(), "2024-03-01 00:00:00"),
            other => panic!("expected a date cell, got {other:?}"),
        }
    }

    #[test]
    fn test_offset_range_is_padded_to_a1() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(2, 2, "C3").unwrap();
        sheet.write_number(3, 3, 7.0).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let grid = parse_sheet(&bytes).unwrap();
        assert_eq!(grid.rows.len(), 4);
        assert!(grid.rows[0].is_empty());
        assert_eq!(grid.rows[2][2], CellValue::Text("C3".into()));
        assert_eq!(grid.rows[3][3], CellValue::Number(7.0));
        assert_eq!(grid.headers.last().map(String::as_str), Some("D"));
    }

    #[test]
    fn test_unrepresentable_date_cell_keeps_serial() {
        let cell = Data::DateTime(calamine::ExcelDateTime::new(
            1.0e9,
            calamine::ExcelDateTimeType::DateTime,
            false,
        ));
        let value = cell_value(&cell);
        assert_eq!(value, CellValue::Number(1.0e9));

        let err = crate::coercion::coerce(&value, crate::coercion::DataType::Date).unwrap_err();
        assert!(err.to_string().contains("1000000000"));
    }

    #[test]
    fn test_garbage_bytes_fail() {
        let err = parse_sheet(b"definitely not a workbook").unwrap_err();
        assert!(matches!(
            err,
            QuoteMapError::ParseFailure {
                kind: SourceKind::Spreadsheet,
                ..
            }
        ));
    }
}
