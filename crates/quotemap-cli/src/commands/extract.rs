use quotemap_core::error::QuoteMapError;
use quotemap_core::export::{export_table, ExportFormat};
use quotemap_core::extraction::pdftotext::PdftotextExtractor;
use quotemap_core::mapping::Record;
use quotemap_core::store::{MemoryStore, TemplateStore};
use quotemap_core::template::schema::MappingTemplate;
use quotemap_core::template::{builtin, load_template};
use std::path::{Path, PathBuf};

use crate::commands::{parse_options, resolve_kind};
use crate::output;

pub struct ExtractArgs {
    pub input_file: PathBuf,
    pub template: Option<PathBuf>,
    pub preset: Option<String>,
    pub kind: Option<String>,
    pub delimiter: Option<u8>,
    pub output: String,
    pub records: Option<PathBuf>,
    pub export: Option<PathBuf>,
}

pub fn run(args: ExtractArgs) -> Result<(), QuoteMapError> {
    // Template warnings are logged at warn level by the ingest pipeline.
    let template = load(args.template.as_deref(), args.preset.as_deref())?;

    let kind = match args.kind.as_deref() {
        Some(declared) => declared.parse()?,
        // Fall back to the template's kind when the extension says nothing useful.
        None => resolve_kind(&args.input_file, None).unwrap_or(template.source_kind),
    };
    let options = parse_options(&args.input_file, args.delimiter);
    tracing::debug!(%kind, template = template.label(), "resolved upload kind");
    let bytes = std::fs::read(&args.input_file)?;

    let store = MemoryStore::new();
    let template = store.save_template(template)?;
    let template_id = template.id.clone().unwrap_or_default();
    let upload_name = args
        .input_file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| args.input_file.display().to_string());

    let extractor = PdftotextExtractor::new();
    let outcome = quotemap_core::ingest_upload(
        &store,
        &upload_name,
        &bytes,
        kind,
        &template_id,
        &extractor,
        &options,
    )?;
    let result = outcome.result;

    match args.output.as_str() {
        "json" => output::json::print_extraction(&result)?,
        _ => output::table::print_extraction(&result, &template),
    }

    let records: Vec<Record> = outcome.stored.into_iter().map(|r| r.fields).collect();

    if let Some(path) = &args.records {
        output::json::write_records(&records, path)?;
        eprintln!("Wrote {} record(s) to {}", records.len(), path.display());
    }

    if let Some(path) = &args.export {
        let format = ExportFormat::from_path(path)?;
        let bytes = export_table(&result.result_headers, &records, format)?;
        std::fs::write(path, bytes)?;
        eprintln!("Exported {} record(s) to {}", records.len(), path.display());
    }

    Ok(())
}

fn load(template: Option<&Path>, preset: Option<&str>) -> Result<MappingTemplate, QuoteMapError> {
    match (template, preset) {
        (Some(path), _) => load_template(path),
        (None, Some(name)) => builtin::load_preset(name),
        (None, None) => Err(QuoteMapError::TemplateInvalid(
            "no template given. Use --template FILE or --preset NAME".into(),
        )),
    }
}
