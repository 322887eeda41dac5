use regex::Regex;
use std::collections::HashMap;

use crate::coercion::{coerce, FieldValue};
use crate::error::QuoteMapError;
use crate::mapping::locator::column_to_index;
use crate::mapping::outcome::{ExtractionResult, ExtractionTotals, RowError, RowOutcome};
use crate::model::{CellValue, DelimitedTable, NormalizedDocument, SheetGrid};
use crate::template::schema::{FieldMapping, MappingTemplate};
use crate::template::{compile_patterns, validate_template};

/// Apply a mapping template to a parsed document.
///
/// Fails only for a malformed template or a document of the wrong kind. Missing
/// or invalid values are reported per row in the result, and a row with any
/// error is left out of `mapped_rows`.
pub fn apply_template(
    doc: &NormalizedDocument,
    template: &MappingTemplate,
) -> Result<ExtractionResult, QuoteMapError> {
    validate_template(template)?;

    if doc.source_kind() != template.source_kind {
        return Err(QuoteMapError::IncompatibleTemplate {
            document: doc.source_kind(),
            template: template.source_kind,
        });
    }

    tracing::debug!(
        kind = %template.source_kind,
        template = template.label(),
        fields = template.field_mappings.len(),
        "applying template"
    );

    let outcomes = match doc {
        NormalizedDocument::Spreadsheet(grid) => map_sheet(grid, template),
        NormalizedDocument::DelimitedText(table) => map_table(table, template),
        NormalizedDocument::FreeText(doc) => {
            let patterns = compile_patterns(template)?;
            vec![map_text(&doc.text, template, &patterns)]
        }
    };

    Ok(merge(template, outcomes))
}

fn map_sheet(grid: &SheetGrid, template: &MappingTemplate) -> Vec<RowOutcome> {
    let columns: Vec<Option<usize>> = template
        .field_mappings
        .iter()
        .map(|m| column_to_index(&m.source_locator))
        .collect();

    grid.rows
        .iter()
        .enumerate()
        .skip(template.skip_rows)
        .enumerate()
        .map(|(position, (index, cells))| {
            map_row(template, position + 1, index + 1, |i, _| {
                columns[i].and_then(|col| cells.get(col))
            })
        })
        .collect()
}

fn map_table(table: &DelimitedTable, template: &MappingTemplate) -> Vec<RowOutcome> {
    table
        .rows
        .iter()
        .enumerate()
        .skip(template.skip_rows)
        .enumerate()
        .map(|(position, (index, row))| {
            // Header is line 1, so without recorded positions record N sits on line N + 1.
            let source_row = table.line_numbers.get(index).copied().unwrap_or(index + 2);
            map_row(template, position + 1, source_row, |_, mapping| {
                row.get(mapping.source_locator.trim())
            })
        })
        .collect()
}

/// Map one tabular row. `lookup` receives the mapping index and the mapping.
fn map_row<'a, F>(
    template: &MappingTemplate,
    row: usize,
    source_row: usize,
    lookup: F,
) -> RowOutcome
where
    F: Fn(usize, &FieldMapping) -> Option<&'a CellValue>,
{
    let mut outcome = RowOutcome::default();
    for (i, mapping) in template.field_mappings.iter().enumerate() {
        let resolved = resolve(mapping, lookup(i, mapping), || {
            format!("required field '{}' has no value", mapping.field_name)
        });
        record(&mut outcome, mapping, resolved, row, source_row);
    }
    finish(outcome)
}

/// Map the whole text of a free-text document as a single row.
fn map_text(
    text: &str,
    template: &MappingTemplate,
    patterns: &HashMap<String, Regex>,
) -> RowOutcome {
    let mut outcome = RowOutcome::default();
    for mapping in &template.field_mappings {
        let field = &mapping.field_name;
        let Some(regex) = patterns.get(field) else {
            if mapping.required {
                let message = format!("required field '{field}' has no text pattern");
                record(&mut outcome, mapping, Err(message), 1, 1);
            }
            continue;
        };

        let captured = regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(|s| CellValue::Text(s.to_string()));

        let resolved = resolve(mapping, captured.as_ref(), || {
            format!(
                "required field '{field}' not found by pattern '{}'",
                regex.as_str()
            )
        });
        record(&mut outcome, mapping, resolved, 1, 1);
    }
    finish(outcome)
}

/// Coerce a located value. `Ok(None)` means the field is omitted from the record.
fn resolve(
    mapping: &FieldMapping,
    raw: Option<&CellValue>,
    missing: impl FnOnce() -> String,
) -> Result<Option<FieldValue>, String> {
    let coerced = match raw {
        Some(value) => coerce(value, mapping.data_type)
            .map_err(|e| format!("field '{}': {e}", mapping.field_name))?,
        None => None,
    };
    match coerced {
        None if mapping.required => Err(missing()),
        other => Ok(other),
    }
}

fn record(
    outcome: &mut RowOutcome,
    mapping: &FieldMapping,
    resolved: Result<Option<FieldValue>, String>,
    row: usize,
    source_row: usize,
) {
    match resolved {
        Ok(Some(value)) => {
            outcome.fields.insert(mapping.field_name.clone(), value);
        }
        Ok(None) => {}
        Err(message) => outcome.errors.push(RowError {
            row,
            source_row,
            field: mapping.field_name.clone(),
            message,
        }),
    }
}

/// A row with errors contributes no partial record.
fn finish(mut outcome: RowOutcome) -> RowOutcome {
    if !outcome.errors.is_empty() {
        outcome.fields.clear();
    }
    outcome
}

fn merge(template: &MappingTemplate, outcomes: Vec<RowOutcome>) -> ExtractionResult {
    let mut result = ExtractionResult {
        result_headers: template.field_names(),
        ..Default::default()
    };

    let total_rows = outcomes.len();
    let mut error_rows = 0;
    for outcome in outcomes {
        if outcome.errors.is_empty() {
            result.mapped_rows.push(outcome.fields);
        } else {
            error_rows += 1;
            if let Some(first) = outcome.errors.first() {
                tracing::trace!(
                    row = first.row,
                    source_row = first.source_row,
                    errors = outcome.errors.len(),
                    "row excluded"
                );
            }
            result.row_errors.extend(outcome.errors);
        }
    }

    result.totals = ExtractionTotals {
        total_rows,
        mapped_rows: result.mapped_rows.len(),
        error_rows,
    };
    tracing::info!(
        total = result.totals.total_rows,
        mapped = result.totals.mapped_rows,
        errors = result.totals.error_rows,
        "extraction finished"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercion::DataType;
    use crate::model::{SourceKind, TextDocument};
    use rust_decimal_macros::dec;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn sheet(rows: Vec<Vec<CellValue>>) -> NormalizedDocument {
        NormalizedDocument::Spreadsheet(SheetGrid::new(rows))
    }

    fn free_text(s: &str) -> NormalizedDocument {
        NormalizedDocument::FreeText(TextDocument {
            text: s.to_string(),
            page_count: 1,
        })
    }

    fn sheet_template(mappings: Vec<FieldMapping>) -> MappingTemplate {
        let mut t = MappingTemplate::new(SourceKind::Spreadsheet, mappings);
        t.skip_rows = 1;
        t
    }

    #[test]
    fn test_fields_in_mapping_order() {
        let doc = sheet(vec![
            vec![text("Id"), text("Total")],
            vec![text("Q-1"), CellValue::Number(10.0)],
        ]);
        let template = sheet_template(vec![
            FieldMapping::new("total", "B", DataType::Number),
            FieldMapping::new("id", "a", DataType::String),
        ]);
        let result = apply_template(&doc, &template).unwrap();
        assert_eq!(result.result_headers, vec!["total", "id"]);
        let keys: Vec<&String> = result.mapped_rows[0].keys().collect();
        assert_eq!(keys, vec!["total", "id"]);
        assert_eq!(result.mapped_rows[0]["total"], FieldValue::Number(dec!(10)));
    }

    #[test]
    fn test_optional_missing_is_omitted() {
        let doc = sheet(vec![vec![text("Id")], vec![text("Q-1")]]);
        let template = sheet_template(vec![
            FieldMapping::new("id", "A", DataType::String).required(),
            FieldMapping::new("note", "D", DataType::String),
        ]);
        let result = apply_template(&doc, &template).unwrap();
        assert_eq!(result.totals.mapped_rows, 1);
        assert!(!result.mapped_rows[0].contains_key("note"));
        assert!(result.row_errors.is_empty());
    }

    #[test]
    fn test_row_with_error_contributes_nothing() {
        let doc = sheet(vec![
            vec![text("Id"), text("Total")],
            vec![text("Q-1"), text("abc")],
        ]);
        let template = sheet_template(vec![
            FieldMapping::new("id", "A", DataType::String).required(),
            FieldMapping::new("total", "B", DataType::Number),
        ]);
        let result = apply_template(&doc, &template).unwrap();
        assert!(result.mapped_rows.is_empty());
        assert_eq!(result.row_errors.len(), 1);
        let err = &result.row_errors[0];
        assert_eq!((err.row, err.source_row), (1, 2));
        assert_eq!(err.field, "total");
        assert!(err.message.contains("'abc'"));
        assert!(err.message.contains("number"));
    }

    #[test]
    fn test_errors_are_row_major_then_field_order() {
        let doc = sheet(vec![vec![], vec![]]);
        let template = MappingTemplate::new(
            SourceKind::Spreadsheet,
            vec![
                FieldMapping::new("a", "A", DataType::String).required(),
                FieldMapping::new("b", "B", DataType::String).required(),
            ],
        );
        let result = apply_template(&doc, &template).unwrap();
        let order: Vec<(usize, &str)> = result
            .row_errors
            .iter()
            .map(|e| (e.row, e.field.as_str()))
            .collect();
        assert_eq!(order, vec![(1, "a"), (1, "b"), (2, "a"), (2, "b")]);
        assert_eq!(result.totals.error_rows, 2);
    }

    #[test]
    fn test_skip_rows_past_end() {
        let doc = sheet(vec![vec![text("only")]]);
        let mut template = sheet_template(vec![FieldMapping::new("a", "A", DataType::String)]);
        template.skip_rows = 5;
        let result = apply_template(&doc, &template).unwrap();
        assert_eq!(result.totals, ExtractionTotals::default());
    }

    #[test]
    fn test_delimited_lookup_by_header() {
        let mut row = HashMap::new();
        row.insert("Total".to_string(), text(" 12.50 "));
        let doc = NormalizedDocument::DelimitedText(DelimitedTable {
            headers: vec!["Total".into()],
            rows: vec![row, HashMap::new()],
            line_numbers: vec![2, 4],
        });
        let template = MappingTemplate::new(
            SourceKind::DelimitedText,
            vec![FieldMapping::new("total", "Total", DataType::Number).required()],
        );
        let result = apply_template(&doc, &template).unwrap();
        assert_eq!(result.mapped_rows[0]["total"], FieldValue::Number(dec!(12.50)));
        assert_eq!(result.row_errors[0].row, 2);
        assert_eq!(result.row_errors[0].source_row, 4);
        assert_eq!(
            result.row_errors[0].message,
            "required field 'total' has no value"
        );
    }

    #[test]
    fn test_kind_mismatch_is_fatal() {
        let template = sheet_template(vec![FieldMapping::new("a", "A", DataType::String)]);
        let err = apply_template(&free_text("hello"), &template).unwrap_err();
        assert!(matches!(
            err,
            QuoteMapError::IncompatibleTemplate {
                document: SourceKind::FreeText,
                template: SourceKind::Spreadsheet
            }
        ));
    }

    #[test]
    fn test_invalid_template_is_fatal() {
        let template = MappingTemplate::new(SourceKind::Spreadsheet, vec![]);
        assert!(matches!(
            apply_template(&sheet(vec![]), &template),
            Err(QuoteMapError::TemplateInvalid(_))
        ));
    }

    #[test]
    fn test_free_text_pattern_and_missing_pattern() {
        let mut template = MappingTemplate::new(
            SourceKind::FreeText,
            vec![
                FieldMapping::new("total", "", DataType::Number).required(),
                FieldMapping::new("supplier", "", DataType::String),
                FieldMapping::new("quotationId", "", DataType::String).required(),
            ],
        );
        template
            .text_patterns
            .insert("total".into(), r"Total:\s*(\d+)".into());
        template
            .text_patterns
            .insert("supplier".into(), r"Supplier:\s*(\w+)".into());

        let result = apply_template(&free_text("TOTAL: 4200"), &template).unwrap();
        assert_eq!(result.totals.total_rows, 1);
        assert!(result.mapped_rows.is_empty());
        assert_eq!(result.row_errors.len(), 1);
        assert_eq!(
            result.row_errors[0].message,
            "required field 'quotationId' has no text pattern"
        );
    }

    #[test]
    fn test_free_text_optional_without_match_is_omitted() {
        let mut template = MappingTemplate::new(
            SourceKind::FreeText,
            vec![
                FieldMapping::new("total", "", DataType::Number).required(),
                FieldMapping::new("validUntil", "", DataType::Date),
            ],
        );
        template
            .text_patterns
            .insert("total".into(), r"Total:\s*(\d+)".into());
        template
            .text_patterns
            .insert("validUntil".into(), r"Valid until:\s*(\S+)".into());

        let result = apply_template(&free_text("Quote Total: 99"), &template).unwrap();
        assert_eq!(result.mapped_rows.len(), 1);
        assert_eq!(result.mapped_rows[0].len(), 1);
        assert_eq!(result.mapped_rows[0]["total"], FieldValue::Number(dec!(99)));
    }
}
