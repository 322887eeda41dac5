use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::coercion::FieldValue;
use crate::error::QuoteMapError;
use crate::mapping::outcome::Record;

pub const SHEET_NAME: &str = "Quotes";

const MIN_COLUMN_WIDTH: usize = 8;
const MAX_COLUMN_WIDTH: usize = 60;
const MAX_COLUMNS: usize = 16_384;
const MAX_ROWS: usize = 1_048_576;

/// Write records to a single-sheet xlsx workbook with a bold, frozen header row.
pub fn write_xlsx(columns: &[String], records: &[Record]) -> Result<Vec<u8>, QuoteMapError> {
    if columns.len() > MAX_COLUMNS || records.len() >= MAX_ROWS {
        return Err(QuoteMapError::Export(format!(
            "{} rows x {} columns does not fit in one worksheet",
            records.len(),
            columns.len()
        )));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(xlsx_error)?;

    let header_format = Format::new().set_bold();
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();

    for (col, name) in columns.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, &header_format)
            .map_err(xlsx_error)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = index as u32 + 1;
        for (col, name) in columns.iter().enumerate() {
            let Some(value) = record.get(name) else {
                continue;
            };
            let col16 = col as u16;
            match value {
                FieldValue::Number(d) => {
                    let n = d.to_f64().ok_or_else(|| {
                        QuoteMapError::Export(format!("number {d} cannot be written to a cell"))
                    })?;
                    worksheet.write_number(row, col16, n).map_err(xlsx_error)?;
                }
                FieldValue::Bool(b) => {
                    worksheet.write_boolean(row, col16, *b).map_err(xlsx_error)?;
                }
                FieldValue::Text(_) | FieldValue::Date(_) => {
                    worksheet
                        .write_string(row, col16, value.to_string())
                        .map_err(xlsx_error)?;
                }
            }
            widths[col] = widths[col].max(value.to_string().chars().count());
        }
    }

    for (col, width) in widths.iter().enumerate() {
        let width = (*width + 2).clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH);
        worksheet
            .set_column_width(col as u16, width as f64)
            .map_err(xlsx_error)?;
    }
    worksheet.set_freeze_panes(1, 0).map_err(xlsx_error)?;

    workbook.save_to_buffer().map_err(xlsx_error)
}

fn xlsx_error(e: XlsxError) -> QuoteMapError {
    QuoteMapError::Export(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::spreadsheet::parse_sheet;
    use crate::model::CellValue;
    use rust_decimal_macros::dec;

    #[test]
    fn test_typed_cells_and_blank_gaps() {
        let mut first = Record::new();
        first.insert("id".into(), FieldValue::Text("Q-1".into()));
        first.insert("total".into(), FieldValue::Number(dec!(4200)));
        let mut second = Record::new();
        second.insert("id".into(), FieldValue::Text("Q-2".into()));
        second.insert("approved".into(), FieldValue::Bool(true));

        let columns = vec!["id".to_string(), "total".to_string(), "approved".to_string()];
        let bytes = write_xlsx(&columns, &[first, second]).unwrap();

        let grid = parse_sheet(&bytes).unwrap();
        assert_eq!(grid.rows.len(), 3);
        assert_eq!(grid.rows[0][0], CellValue::Text("id".into()));
        assert_eq!(grid.rows[1][1], CellValue::Number(4200.0));
        assert_eq!(grid.rows[2][1], CellValue::Empty);
        assert_eq!(grid.rows[2][2], CellValue::Bool(true));
    }

    #[test]
    fn test_header_only_workbook() {
        let bytes = write_xlsx(&["id".to_string()], &[]).unwrap();
        let grid = parse_sheet(&bytes).unwrap();
        assert_eq!(grid.rows, vec![vec![CellValue::Text("id".into())]]);
    }
}
