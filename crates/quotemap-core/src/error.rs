use std::path::PathBuf;

use crate::model::SourceKind;

#[derive(Debug, thiserror::Error)]
pub enum QuoteMapError {
    #[error("unsupported document format: {0}. Expected spreadsheet, delimited-text or free-text")]
    UnsupportedFormat(String),

    #[error("failed to parse {kind} document: {reason}")]
    ParseFailure { kind: SourceKind, reason: String },

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("failed to load template from {path}: {reason}")]
    TemplateLoad { path: PathBuf, reason: String },

    #[error("invalid template: {0}")]
    TemplateInvalid(String),

    #[error("template '{0}' not found")]
    TemplateNotFound(String),

    #[error("template expects a {template} document but got {document}")]
    IncompatibleTemplate {
        document: SourceKind,
        template: SourceKind,
    },

    #[error("export failed: {0}")]
    Export(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
