use quotemap_core::error::QuoteMapError;
use quotemap_core::extraction::pdftotext::PdftotextExtractor;
use std::path::PathBuf;

use crate::commands::{parse_options, resolve_kind};
use crate::output;

pub fn run(
    input_file: PathBuf,
    kind: Option<String>,
    delimiter: Option<u8>,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), QuoteMapError> {
    let kind = resolve_kind(&input_file, kind.as_deref())?;
    let options = parse_options(&input_file, delimiter);
    let bytes = std::fs::read(&input_file)?;
    let extractor = PdftotextExtractor::new();
    let doc = quotemap_core::parse_document(&bytes, kind, &extractor, &options)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            output::json::write_document(&doc, &path)?;
            eprintln!(
                "Parsed {} document with {} row(s), written to {}",
                doc.source_kind(),
                doc.row_count(),
                path.display()
            );
        }
        None => match output_format {
            "json" => output::json::print_document(&doc)?,
            _ => output::table::print_document(&doc),
        },
    }

    Ok(())
}
