use quotemap_core::analytics::{group_totals, summarize};
use quotemap_core::error::QuoteMapError;
use std::path::PathBuf;

use crate::commands::read_records;
use crate::output;

pub fn run(
    records_file: PathBuf,
    field: &str,
    group_by: Option<&str>,
    output_format: &str,
) -> Result<(), QuoteMapError> {
    let records = read_records(&records_file)?;
    let summary = summarize(&records, field);
    let groups = group_by.map(|g| group_totals(&records, g, field));

    match output_format {
        "json" => output::json::print_summary(&summary, groups.as_deref())?,
        _ => output::table::print_summary(&summary, group_by, groups.as_deref()),
    }
    Ok(())
}
