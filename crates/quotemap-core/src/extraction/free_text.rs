use crate::error::QuoteMapError;
use crate::extraction::{PageContent, PdfExtractor};
use crate::model::{SourceKind, TextDocument};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Turn a PDF or plain-text upload into one block of text.
pub fn parse_free_text(
    bytes: &[u8],
    extractor: &dyn PdfExtractor,
) -> Result<TextDocument, QuoteMapError> {
    let pages = if bytes.starts_with(PDF_MAGIC) {
        tracing::debug!(backend = extractor.backend_name(), "extracting PDF text");
        extractor.extract_pages(bytes)?
    } else {
        let text = std::str::from_utf8(bytes).map_err(|e| QuoteMapError::ParseFailure {
            kind: SourceKind::FreeText,
            reason: format!("input is neither a PDF nor UTF-8 text: {e}"),
        })?;
        plain_text_pages(text)
    };

    Ok(TextDocument {
        text: assemble_text(&pages),
        page_count: pages.len(),
    })
}

/// Plain text uses form feeds as page breaks, like pdftotext output.
fn plain_text_pages(text: &str) -> Vec<PageContent> {
    text.split('\x0c')
        .enumerate()
        .map(|(i, page)| PageContent {
            page_number: i + 1,
            lines: page.lines().map(str::to_string).collect(),
        })
        .collect()
}

/// Join the non-empty trimmed fragments of each page with single spaces, and
/// the pages with newlines. Pages without text contribute nothing.
pub fn assemble_text(pages: &[PageContent]) -> String {
    pages
        .iter()
        .map(|page| {
            page.lines
                .iter()
                .map(|line| line.trim())
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
