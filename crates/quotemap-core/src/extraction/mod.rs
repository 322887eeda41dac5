pub mod delimited;
pub mod free_text;
pub mod pdftotext;
pub mod spreadsheet;

use std::path::Path;

use crate::error::QuoteMapError;
use crate::model::{NormalizedDocument, SourceKind};

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub page_number: usize,
    /// Text fragments in reading order.
    pub lines: Vec<String>,
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text content from PDF bytes, returning one PageContent per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, QuoteMapError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Knobs for the Document Parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Field delimiter for delimited text.
    pub delimiter: u8,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { delimiter: b',' }
    }
}

impl ParseOptions {
    /// Defaults, with a tab delimiter for `.tsv` files.
    pub fn for_path(path: &Path) -> Self {
        let is_tsv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
        if is_tsv {
            ParseOptions { delimiter: b'\t' }
        } else {
            ParseOptions::default()
        }
    }
}

/// Parse raw upload bytes of a declared kind into a normalized document.
pub fn parse_document(
    bytes: &[u8],
    kind: SourceKind,
    extractor: &dyn PdfExtractor,
    options: &ParseOptions,
) -> Result<NormalizedDocument, QuoteMapError> {
    tracing::debug!(%kind, bytes = bytes.len(), "parsing document");
    let doc = match kind {
        SourceKind::Spreadsheet => NormalizedDocument::Spreadsheet(spreadsheet::parse_sheet(bytes)?),
        SourceKind::DelimitedText => {
            NormalizedDocument::DelimitedText(delimited::parse_delimited(bytes, options.delimiter)?)
        }
        SourceKind::FreeText => NormalizedDocument::FreeText(free_text::parse_free_text(bytes, extractor)?),
    };
    tracing::debug!(%kind, rows = doc.row_count(), "parsed document");
    Ok(doc)
}
