pub mod export;
pub mod extract;
pub mod parse;
pub mod summary;
pub mod templates;

use quotemap_core::error::QuoteMapError;
use quotemap_core::extraction::ParseOptions;
use quotemap_core::mapping::Record;
use quotemap_core::model::SourceKind;
use std::path::Path;

/// Declared kind if given, else detected from the file extension.
pub fn resolve_kind(path: &Path, declared: Option<&str>) -> Result<SourceKind, QuoteMapError> {
    match declared {
        Some(kind) => kind.parse(),
        None => SourceKind::from_path(path),
    }
}

/// Parse options for a file, with an optional delimiter override.
pub fn parse_options(path: &Path, delimiter: Option<u8>) -> ParseOptions {
    let mut options = ParseOptions::for_path(path);
    if let Some(d) = delimiter {
        options.delimiter = d;
    }
    options
}

/// Read a JSON array of mapped records.
pub fn read_records(path: &Path) -> Result<Vec<Record>, QuoteMapError> {
    let json = std::fs::read(path)?;
    Ok(serde_json::from_slice(&json)?)
}

/// clap value parser for `--delimiter`: one ASCII character, or `tab` / `\t`.
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii() => Ok(c as u8),
                _ => Err(format!("delimiter must be a single ASCII character, got '{s}'")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_values() {
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("§").is_err());
    }

    #[test]
    fn test_declared_kind_wins() {
        let kind = resolve_kind(Path::new("quote.txt"), Some("csv")).unwrap();
        assert_eq!(kind, SourceKind::DelimitedText);
        let kind = resolve_kind(Path::new("quote.txt"), None).unwrap();
        assert_eq!(kind, SourceKind::FreeText);
    }

    #[test]
    fn test_delimiter_override() {
        assert_eq!(parse_options(Path::new("a.tsv"), None).delimiter, b'\t');
        assert_eq!(parse_options(Path::new("a.tsv"), Some(b';')).delimiter, b';');
    }
}
