pub mod builtin;
pub mod schema;

use regex::{Regex, RegexBuilder};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::QuoteMapError;
use crate::mapping::locator::column_to_index;
use crate::model::SourceKind;
use schema::MappingTemplate;

/// Load a template from a JSON file.
pub fn load_template(path: &Path) -> Result<MappingTemplate, QuoteMapError> {
    let content = std::fs::read_to_string(path).map_err(|e| QuoteMapError::TemplateLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_template(&content, path)
}

/// Parse a template from a JSON string.
pub fn parse_template(json: &str, source: &Path) -> Result<MappingTemplate, QuoteMapError> {
    let template: MappingTemplate =
        serde_json::from_str(json).map_err(|e| QuoteMapError::TemplateLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_template(&template)?;
    Ok(template)
}

/// Parse a template from a JSON string (no file path context).
pub fn parse_template_str(json: &str) -> Result<MappingTemplate, QuoteMapError> {
    let template: MappingTemplate = serde_json::from_str(json).map_err(QuoteMapError::Json)?;
    validate_template(&template)?;
    Ok(template)
}

/// Compile a text pattern the way extraction uses it: case-insensitive.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Compile every text pattern of a template, keyed by field name.
pub fn compile_patterns(
    template: &MappingTemplate,
) -> Result<HashMap<String, Regex>, QuoteMapError> {
    template
        .text_patterns
        .iter()
        .map(|(field, pattern)| {
            let regex = compile_pattern(pattern).map_err(|e| {
                QuoteMapError::TemplateInvalid(format!(
                    "text pattern for '{field}' does not compile: {e}"
                ))
            })?;
            if regex.captures_len() < 2 {
                return Err(QuoteMapError::TemplateInvalid(format!(
                    "text pattern for '{field}' has no capture group"
                )));
            }
            Ok((field.clone(), regex))
        })
        .collect()
}

/// Validate that a template is structurally well-formed.
pub fn validate_template(template: &MappingTemplate) -> Result<(), QuoteMapError> {
    if template.field_mappings.is_empty() {
        return Err(QuoteMapError::TemplateInvalid(
            "fieldMappings must not be empty".into(),
        ));
    }

    let mut seen = HashSet::new();
    for mapping in &template.field_mappings {
        let name = mapping.field_name.trim();
        if name.is_empty() {
            return Err(QuoteMapError::TemplateInvalid(
                "field name must not be empty".into(),
            ));
        }
        if !seen.insert(mapping.field_name.as_str()) {
            return Err(QuoteMapError::TemplateInvalid(format!(
                "duplicate field name '{}'",
                mapping.field_name
            )));
        }

        match template.source_kind {
            SourceKind::Spreadsheet => {
                if column_to_index(&mapping.source_locator).is_none() {
                    return Err(QuoteMapError::TemplateInvalid(format!(
                        "field '{}' has invalid column letters '{}' (expected A, B, ..., AA, ...)",
                        mapping.field_name, mapping.source_locator
                    )));
                }
            }
            SourceKind::DelimitedText => {
                if mapping.source_locator.trim().is_empty() {
                    return Err(QuoteMapError::TemplateInvalid(format!(
                        "field '{}' has no source column",
                        mapping.field_name
                    )));
                }
            }
            SourceKind::FreeText => {}
        }
    }

    for field in template.text_patterns.keys() {
        if !seen.contains(field.as_str()) {
            return Err(QuoteMapError::TemplateInvalid(format!(
                "text pattern for unknown field '{field}'"
            )));
        }
    }

    compile_patterns(template)?;
    Ok(())
}

/// Non-fatal problems worth telling the template author about.
pub fn template_warnings(template: &MappingTemplate) -> Vec<String> {
    let mut warnings = Vec::new();

    match template.source_kind {
        SourceKind::FreeText => {
            for mapping in &template.field_mappings {
                if template.text_patterns.contains_key(&mapping.field_name) {
                    continue;
                }
                if mapping.required {
                    warnings.push(format!(
                        "required field '{}' has no text pattern; every document will fail it",
                        mapping.field_name
                    ));
                } else {
                    warnings.push(format!(
                        "field '{}' has no text pattern and will never be extracted",
                        mapping.field_name
                    ));
                }
            }
            if template.skip_rows > 0 {
                warnings.push("skipRows is ignored for free-text templates".into());
            }
        }
        SourceKind::Spreadsheet | SourceKind::DelimitedText => {
            if !template.text_patterns.is_empty() {
                warnings.push(format!(
                    "textPatterns are ignored for {} templates",
                    template.source_kind
                ));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_template() {
        let json = r#"{
            "sourceKind": "spreadsheet",
            "skipRows": 1,
            "fieldMappings": [
                {"fieldName": "quotationId", "sourceLocator": "A", "required": true, "dataType": "string"}
            ],
            "textPatterns": {}
        }"#;
        let t = parse_template_str(json).unwrap();
        assert_eq!(t.source_kind, SourceKind::Spreadsheet);
        assert_eq!(t.skip_rows, 1);
        assert_eq!(t.field_names(), vec!["quotationId"]);
        assert!(t.field_mappings[0].required);
    }

    #[test]
    fn test_defaults_for_optional_keys() {
        let json = r#"{
            "sourceKind": "csv",
            "fieldMappings": [
                {"fieldName": "total", "sourceLocator": "Total", "dataType": "number"}
            ]
        }"#;
        let t = parse_template_str(json).unwrap();
        assert_eq!(t.source_kind, SourceKind::DelimitedText);
        assert_eq!(t.skip_rows, 0);
        assert!(!t.field_mappings[0].required);
        assert!(t.text_patterns.is_empty());
    }

    #[test]
    fn test_empty_mappings_rejected() {
        let json = r#"{"sourceKind": "spreadsheet", "fieldMappings": []}"#;
        assert!(matches!(
            parse_template_str(json),
            Err(QuoteMapError::TemplateInvalid(_))
        ));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let json = r#"{
            "sourceKind": "spreadsheet",
            "fieldMappings": [
                {"fieldName": "a", "sourceLocator": "A", "dataType": "string"},
                {"fieldName": "a", "sourceLocator": "B", "dataType": "string"}
            ]
        }"#;
        let err = parse_template_str(json).unwrap_err();
        assert!(err.to_string().contains("duplicate field name 'a'"));
    }

    #[test]
    fn test_bad_column_letters_rejected() {
        let json = r#"{
            "sourceKind": "spreadsheet",
            "fieldMappings": [
                {"fieldName": "a", "sourceLocator": "A1", "dataType": "string"}
            ]
        }"#;
        assert!(parse_template_str(json).is_err());
    }

    #[test]
    fn test_empty_csv_column_rejected() {
        let json = r#"{
            "sourceKind": "delimited-text",
            "fieldMappings": [
                {"fieldName": "a", "sourceLocator": " ", "dataType": "string"}
            ]
        }"#;
        assert!(parse_template_str(json).is_err());
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let json = r#"{
            "sourceKind": "free-text",
            "fieldMappings": [{"fieldName": "total", "dataType": "number"}],
            "textPatterns": {"total": "Total: ([0-9+"}
        }"#;
        let err = parse_template_str(json).unwrap_err();
        assert!(err.to_string().contains("does not compile"));
    }

    #[test]
    fn test_pattern_without_group_rejected() {
        let json = r#"{
            "sourceKind": "free-text",
            "fieldMappings": [{"fieldName": "total", "dataType": "number"}],
            "textPatterns": {"total": "Total: \\d+"}
        }"#;
        let err = parse_template_str(json).unwrap_err();
        assert!(err.to_string().contains("no capture group"));
    }

    #[test]
    fn test_pattern_for_unknown_field_rejected() {
        let json = r#"{
            "sourceKind": "free-text",
            "fieldMappings": [{"fieldName": "total", "dataType": "number"}],
            "textPatterns": {"totl": "Total: (\\d+)"}
        }"#;
        assert!(parse_template_str(json).is_err());
    }

    #[test]
    fn test_unknown_source_kind_rejected() {
        let json = r#"{
            "sourceKind": "docx",
            "fieldMappings": [{"fieldName": "a", "sourceLocator": "A", "dataType": "string"}]
        }"#;
        assert!(matches!(parse_template_str(json), Err(QuoteMapError::Json(_))));
    }

    #[test]
    fn test_missing_pattern_is_a_warning_not_an_error() {
        let json = r#"{
            "sourceKind": "free-text",
            "skipRows": 2,
            "fieldMappings": [
                {"fieldName": "total", "required": true, "dataType": "number"},
                {"fieldName": "note", "dataType": "string"}
            ]
        }"#;
        let t = parse_template_str(json).unwrap();
        let warnings = template_warnings(&t);
        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("required field 'total'"));
        assert!(warnings[1].contains("'note'"));
        assert!(warnings[2].contains("skipRows"));
    }

    #[test]
    fn test_patterns_are_case_insensitive() {
        let re = compile_pattern(r"total:\s*(\d+)").unwrap();
        assert_eq!(&re.captures("TOTAL: 42").unwrap()[1], "42");
    }

    #[test]
    fn test_load_template_missing_file() {
        let err = load_template(Path::new("/nonexistent/template.json")).unwrap_err();
        assert!(matches!(err, QuoteMapError::TemplateLoad { .. }));
    }
}
