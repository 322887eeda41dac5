use quotemap_core::analytics::{FieldSummary, GroupTotal};
use quotemap_core::error::QuoteMapError;
use quotemap_core::mapping::{ExtractionResult, Record};
use quotemap_core::model::NormalizedDocument;
use std::path::Path;

pub fn print_document(doc: &NormalizedDocument) -> Result<(), QuoteMapError> {
    let json = serde_json::to_string_pretty(doc)?;
    println!("{json}");
    Ok(())
}

pub fn write_document(doc: &NormalizedDocument, path: &Path) -> Result<(), QuoteMapError> {
    let json = serde_json::to_string_pretty(doc)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn print_extraction(result: &ExtractionResult) -> Result<(), QuoteMapError> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

pub fn write_records(records: &[Record], path: &Path) -> Result<(), QuoteMapError> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Summary object, with a `groups` array when grouping was asked for.
pub fn print_summary(
    summary: &FieldSummary,
    groups: Option<&[GroupTotal]>,
) -> Result<(), QuoteMapError> {
    let mut value = serde_json::to_value(summary)?;
    if let (Some(groups), Some(obj)) = (groups, value.as_object_mut()) {
        obj.insert("groups".into(), serde_json::to_value(groups)?);
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
