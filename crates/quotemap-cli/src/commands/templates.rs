use quotemap_core::error::QuoteMapError;
use quotemap_core::template::schema::MappingTemplate;
use quotemap_core::template::{builtin, load_template, template_warnings};
use std::path::Path;

pub fn list() -> Result<(), QuoteMapError> {
    println!("Available predefined templates:\n");
    for name in builtin::PRESETS {
        let t = builtin::load_preset(name)?;
        println!(
            "  {:<12} {} [{}, {} field(s)]",
            name,
            t.name.as_deref().unwrap_or(name),
            t.source_kind,
            t.field_mappings.len()
        );
        if let Some(ref desc) = t.description {
            println!("               {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn show(preset: &str) -> Result<(), QuoteMapError> {
    let t = builtin::load_preset(preset)?;
    println!("{} ({})\n", t.label(), t.source_kind);
    if let Some(ref desc) = t.description {
        println!("{}\n", desc);
    }
    if t.skip_rows > 0 {
        println!("Skips the first {} row(s).\n", t.skip_rows);
    }
    print_mappings(&t);
    println!("\nJSON:\n{}", serde_json::to_string_pretty(&t)?);
    Ok(())
}

fn print_mappings(t: &MappingTemplate) {
    let name_width = t
        .field_mappings
        .iter()
        .map(|m| m.field_name.len())
        .max()
        .unwrap_or(5)
        .max(5);

    println!(
        "  {:<width$}  {:<8}  {:<8}  Source",
        "Field",
        "Type",
        "Required",
        width = name_width
    );
    println!("  {}", "-".repeat(name_width + 32));
    for m in &t.field_mappings {
        let source = if t.source_kind.is_tabular() {
            m.source_locator.clone()
        } else {
            t.text_patterns
                .get(&m.field_name)
                .map(|p| format!("/{p}/"))
                .unwrap_or_else(|| "(no pattern)".into())
        };
        println!(
            "  {:<width$}  {:<8}  {:<8}  {}",
            m.field_name,
            m.data_type,
            if m.required { "yes" } else { "no" },
            source,
            width = name_width
        );
    }
}

pub fn schema() -> Result<(), QuoteMapError> {
    print!(
        r#"JSON Template Schema
====================

A template tells `quotemap extract` where each field of a quotation lives
in an uploaded document and what type it must have.

Top-level fields:
  name          (string, optional)  Human-readable name
  description   (string, optional)  What the template is for
  sourceKind    (string, required)  "spreadsheet", "delimited-text" or
                                    "free-text" (aliases: excel, xlsx, csv,
                                    tsv, pdf, text)
  skipRows      (number, optional)  Leading rows to ignore, e.g. 1 to skip
                                    a header row in a spreadsheet.
                                    Default 0. Tabular documents only.
  fieldMappings (array, required)   Fields to extract, in output order
  textPatterns  (object, optional)  Free text only: field name -> regular
                                    expression. The first capture group is
                                    the value. Matching ignores case.

Each entry in "fieldMappings":
  fieldName     (string, required)  Output field name, unique
  sourceLocator (string)            Spreadsheet: column letters ("A", "AB").
                                    Delimited text: header name.
                                    Free text: unused.
  required      (bool, optional)    A row missing this field is rejected
                                    and reported. Default false.
  dataType      (string, required)  "string", "number" or "date"

Numbers are plain decimals ("4200", "-12.5", ".5"); thousands separators
are rejected. Dates accept ISO 8601, RFC 2822, 2024/03/01, 03/01/2024,
01.03.2024 and "March 1, 2024"; spreadsheet date cells and serial numbers
also work. Dates are stored as 2024-03-01T00:00:00.000Z.

A row is either mapped completely or rejected: any missing required field
or value that cannot be converted rejects the whole row.

Example:
{{
  "name": "Supplier price list",
  "sourceKind": "spreadsheet",
  "skipRows": 1,
  "fieldMappings": [
    {{"fieldName": "quotationId", "sourceLocator": "A", "required": true, "dataType": "string"}},
    {{"fieldName": "totalAmount", "sourceLocator": "F", "required": true, "dataType": "number"}},
    {{"fieldName": "quoteDate", "sourceLocator": "G", "dataType": "date"}}
  ]
}}

Free-text example:
{{
  "sourceKind": "free-text",
  "fieldMappings": [
    {{"fieldName": "totalAmount", "required": true, "dataType": "number"}}
  ],
  "textPatterns": {{
    "totalAmount": "Total:\\s*([0-9]+(?:\\.[0-9]+)?)"
  }}
}}
"#
    );
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), QuoteMapError> {
    let t = load_template(file)?;

    println!("Template '{}' is valid.", t.label());
    println!("  Kind: {}", t.source_kind);
    println!(
        "  Fields: {} ({} required)",
        t.field_mappings.len(),
        t.field_mappings.iter().filter(|m| m.required).count()
    );

    let warnings = template_warnings(&t);
    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}
