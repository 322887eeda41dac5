use quotemap_core::analytics::{FieldSummary, GroupTotal};
use quotemap_core::mapping::ExtractionResult;
use quotemap_core::model::{NormalizedDocument, TEXT_FIELD};
use quotemap_core::template::schema::MappingTemplate;

const MAX_CELL_WIDTH: usize = 40;

pub fn print_document(doc: &NormalizedDocument) {
    match doc {
        NormalizedDocument::Spreadsheet(grid) => {
            println!(
                "Spreadsheet: {} row(s), {} column(s)\n",
                grid.rows.len(),
                grid.headers.len()
            );
            let mut headers = vec!["#".to_string()];
            headers.extend(grid.headers.iter().cloned());
            let rows: Vec<Vec<String>> = grid
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    let mut cells = vec![(i + 1).to_string()];
                    cells.extend(
                        (0..grid.headers.len())
                            .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default()),
                    );
                    cells
                })
                .collect();
            print_table(&headers, &rows);
        }
        NormalizedDocument::DelimitedText(table) => {
            println!(
                "Delimited text: {} record(s), {} column(s)\n",
                table.rows.len(),
                table.headers.len()
            );
            let mut headers = vec!["line".to_string()];
            headers.extend(table.headers.iter().cloned());
            let rows: Vec<Vec<String>> = table
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    let line = table.line_numbers.get(i).copied().unwrap_or(i + 2);
                    let mut cells = vec![line.to_string()];
                    cells.extend(
                        table
                            .headers
                            .iter()
                            .map(|h| row.get(h).map(|v| v.to_string()).unwrap_or_default()),
                    );
                    cells
                })
                .collect();
            print_table(&headers, &rows);
        }
        NormalizedDocument::FreeText(text) => {
            println!("Free text: {} page(s), field '{}'\n", text.page_count, TEXT_FIELD);
            println!("{}", text.text);
        }
    }
}

pub fn print_extraction(result: &ExtractionResult, template: &MappingTemplate) {
    println!("=== {} ({}) ===\n", template.label(), template.source_kind);
    println!(
        "  Rows: {} total, {} mapped, {} rejected\n",
        result.totals.total_rows, result.totals.mapped_rows, result.totals.error_rows
    );

    if !result.mapped_rows.is_empty() {
        let rows: Vec<Vec<String>> = result
            .mapped_rows
            .iter()
            .map(|record| {
                result
                    .result_headers
                    .iter()
                    .map(|h| record.get(h).map(|v| v.to_string()).unwrap_or_default())
                    .collect()
            })
            .collect();
        print_table(&result.result_headers, &rows);
        println!();
    }

    if !result.row_errors.is_empty() {
        println!("  Row errors:");
        for (row, errors) in result.errors_by_row() {
            let source_row = errors.first().map(|e| e.source_row).unwrap_or(row);
            println!("    row {} (source row {}):", row, source_row);
            for err in errors {
                println!("      {}", err.message);
            }
        }
        println!();
    }
}

pub fn print_summary(summary: &FieldSummary, group_by: Option<&str>, groups: Option<&[GroupTotal]>) {
    println!("=== {} ===\n", summary.field);
    println!("  Count:   {}", summary.count);
    println!("  Sum:     {}", opt(summary.sum));
    println!("  Min:     {}", opt(summary.min));
    println!("  Max:     {}", opt(summary.max));
    println!("  Average: {}", opt(summary.average.map(|a| a.round_dp(2))));

    if let (Some(group_by), Some(groups)) = (group_by, groups) {
        println!();
        let headers = vec![group_by.to_string(), "count".to_string(), format!("sum({})", summary.field)];
        let rows: Vec<Vec<String>> = groups
            .iter()
            .map(|g| vec![g.key.clone(), g.count.to_string(), g.sum.to_string()])
            .collect();
        print_table(&headers, &rows);
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn print_table(headers: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| cell(h).chars().count()).collect();
    for row in rows {
        for (i, value) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell(value).chars().count());
            }
        }
    }

    let line = |cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", cell(c), width = *w))
            .collect();
        println!("  {}", padded.join("  ").trim_end());
    };

    line(headers);
    println!("  {}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));
    for row in rows {
        line(row);
    }
}

/// Clip long values so one cell cannot blow up the layout.
fn cell(value: &str) -> String {
    if value.chars().count() <= MAX_CELL_WIDTH {
        value.to_string()
    } else {
        let clipped: String = value.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{clipped}...")
    }
}
