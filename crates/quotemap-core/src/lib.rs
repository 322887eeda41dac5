pub mod analytics;
pub mod coercion;
pub mod error;
pub mod export;
pub mod extraction;
pub mod mapping;
pub mod model;
pub mod store;
pub mod template;

use error::QuoteMapError;
use extraction::{ParseOptions, PdfExtractor};
use mapping::{apply_template, ExtractionResult};
use model::SourceKind;
use store::{RecordStore, StoredRecord, TemplateStore};
use template::schema::MappingTemplate;
use template::template_warnings;

pub use extraction::parse_document;

/// What one upload produced: the extraction report and the records persisted from it.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub result: ExtractionResult,
    pub stored: Vec<StoredRecord>,
}

/// Parse an upload as the template's kind and apply the template to it.
pub fn extract_document(
    bytes: &[u8],
    template: &MappingTemplate,
    extractor: &dyn PdfExtractor,
    options: &ParseOptions,
) -> Result<ExtractionResult, QuoteMapError> {
    log_warnings(template);
    let doc = parse_document(bytes, template.source_kind, extractor, options)?;
    apply_template(&doc, template)
}

/// Main API entry point: extract an upload with a stored template and persist
/// the mapped rows.
///
/// The declared kind is checked against the template before any parsing. All
/// mapped rows go to the record store in one batch; nothing is stored when
/// no row mapped.
pub fn ingest_upload<S>(
    store: &S,
    upload_name: &str,
    bytes: &[u8],
    kind: SourceKind,
    template_id: &str,
    extractor: &dyn PdfExtractor,
    options: &ParseOptions,
) -> Result<IngestOutcome, QuoteMapError>
where
    S: TemplateStore + RecordStore + ?Sized,
{
    let template = store
        .get_template(template_id)?
        .ok_or_else(|| QuoteMapError::TemplateNotFound(template_id.to_string()))?;

    if kind != template.source_kind {
        return Err(QuoteMapError::IncompatibleTemplate {
            document: kind,
            template: template.source_kind,
        });
    }

    log_warnings(&template);
    let doc = parse_document(bytes, kind, extractor, options)?;
    let result = apply_template(&doc, &template)?;

    let stored = if result.mapped_rows.is_empty() {
        Vec::new()
    } else {
        store.insert_batch(upload_name, Some(template_id), result.mapped_rows.clone())?
    };

    tracing::info!(
        upload = upload_name,
        template = template_id,
        stored = stored.len(),
        rejected = result.totals.error_rows,
        "ingested upload"
    );
    Ok(IngestOutcome { result, stored })
}

fn log_warnings(template: &MappingTemplate) {
    for warning in template_warnings(template) {
        tracing::warn!(template = template.label(), "{warning}");
    }
}
