use quotemap_core::error::QuoteMapError;
use quotemap_core::export::export_to_path;
use std::path::PathBuf;

use crate::commands::read_records;

pub fn run(records_file: PathBuf, output_file: PathBuf) -> Result<(), QuoteMapError> {
    let records = read_records(&records_file)?;
    export_to_path(&records, &output_file)?;
    eprintln!(
        "Exported {} record(s) to {}",
        records.len(),
        output_file.display()
    );
    Ok(())
}
