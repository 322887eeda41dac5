use crate::error::QuoteMapError;
use crate::template::parse_template_str;
use crate::template::schema::MappingTemplate;

const QUOTE_SHEET_JSON: &str = include_str!("../../../../templates/quote-sheet.json");
const QUOTE_CSV_JSON: &str = include_str!("../../../../templates/quote-csv.json");
const QUOTE_PDF_JSON: &str = include_str!("../../../../templates/quote-pdf.json");

/// Available predefined templates.
pub const PRESETS: &[&str] = &["quote-sheet", "quote-csv", "quote-pdf"];

/// Load a predefined template by name.
///
/// The preset name doubles as the template id.
pub fn load_preset(name: &str) -> Result<MappingTemplate, QuoteMapError> {
    let json = match name {
        "quote-sheet" => QUOTE_SHEET_JSON,
        "quote-csv" => QUOTE_CSV_JSON,
        "quote-pdf" => QUOTE_PDF_JSON,
        _ => {
            return Err(QuoteMapError::TemplateInvalid(format!(
                "unknown preset '{}'. Available: {}",
                name,
                PRESETS.join(", ")
            )))
        }
    };
    let mut template = parse_template_str(json)?;
    template.id = Some(name.to_string());
    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceKind;
    use crate::template::template_warnings;

    #[test]
    fn test_all_presets_load_cleanly() {
        for name in PRESETS {
            let t = load_preset(name).unwrap();
            assert_eq!(t.id.as_deref(), Some(*name));
            assert!(template_warnings(&t).is_empty(), "{name} has warnings");
        }
    }

    #[test]
    fn test_quote_sheet_preset() {
        let t = load_preset("quote-sheet").unwrap();
        assert_eq!(t.source_kind, SourceKind::Spreadsheet);
        assert_eq!(t.skip_rows, 1);
        assert_eq!(t.field_mappings[0].field_name, "quotationId");
        assert!(t.field_mappings[0].required);
    }

    #[test]
    fn test_quote_pdf_preset_patterns() {
        let t = load_preset("quote-pdf").unwrap();
        assert_eq!(t.source_kind, SourceKind::FreeText);
        assert_eq!(t.text_patterns.len(), t.field_mappings.len());
    }

    #[test]
    fn test_unknown_preset() {
        let err = load_preset("xyz").unwrap_err();
        assert!(err.to_string().contains("quote-sheet"));
    }
}
