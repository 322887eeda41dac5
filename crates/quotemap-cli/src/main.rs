mod commands;
mod logging;
mod output;

use clap::{ArgAction, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::commands::extract::ExtractArgs;
use crate::logging::{init_logging, LogConfig};

#[derive(Parser)]
#[command(
    name = "quotemap",
    version,
    about = "Extract supplier quotations from spreadsheets, CSV files and PDFs using mapping templates"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an uploaded document into its normalized form (without mapping)
    Parse {
        /// Path to a spreadsheet, CSV/TSV, PDF or text file
        input_file: PathBuf,

        /// Document kind: spreadsheet, delimited-text or free-text (default: from extension)
        #[arg(short, long)]
        kind: Option<String>,

        /// Field delimiter for delimited text: one character or "tab"
        #[arg(short, long, value_parser = commands::parse_delimiter)]
        delimiter: Option<u8>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the normalized document to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Apply a mapping template to a document and report mapped rows and row errors
    Extract {
        /// Path to a spreadsheet, CSV/TSV, PDF or text file
        input_file: PathBuf,

        /// Custom JSON template file
        #[arg(short, long, value_name = "FILE", conflicts_with = "preset")]
        template: Option<PathBuf>,

        /// Predefined template: quote-sheet, quote-csv, quote-pdf
        #[arg(short, long, value_name = "NAME")]
        preset: Option<String>,

        /// Document kind (default: from extension, then the template's kind)
        #[arg(short, long)]
        kind: Option<String>,

        /// Field delimiter for delimited text: one character or "tab"
        #[arg(short, long, value_parser = commands::parse_delimiter)]
        delimiter: Option<u8>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write mapped records to a JSON file
        #[arg(long, value_name = "FILE")]
        records: Option<PathBuf>,

        /// Export mapped records to .xlsx or .csv
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },
    /// Export a JSON records file to .xlsx or .csv
    Export {
        /// JSON array of records, as written by `extract --records`
        records_file: PathBuf,

        /// Destination file; the extension picks the format
        output_file: PathBuf,
    },
    /// Summarize a numeric field across stored records
    Summary {
        /// JSON array of records, as written by `extract --records`
        records_file: PathBuf,

        /// Numeric field to aggregate
        #[arg(short, long, default_value = "totalAmount")]
        field: String,

        /// Also total the field per distinct value of this field
        #[arg(short, long, value_name = "FIELD")]
        group_by: Option<String>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Manage and inspect mapping templates
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },
}

#[derive(Subcommand)]
enum TemplatesAction {
    /// List predefined templates
    List,
    /// Show a predefined template's mappings and JSON
    Show {
        /// Preset name (e.g., "quote-sheet")
        preset: String,
    },
    /// Print the JSON template format with field descriptions and examples
    Schema,
    /// Validate a custom template file
    Validate {
        /// Path to JSON template file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(
        &LogConfig::from_verbosity(cli.verbose).with_ansi(std::io::stderr().is_terminal()),
    );

    let result = match cli.command {
        Commands::Parse {
            input_file,
            kind,
            delimiter,
            output,
            out,
        } => commands::parse::run(input_file, kind, delimiter, &output, out),
        Commands::Extract {
            input_file,
            template,
            preset,
            kind,
            delimiter,
            output,
            records,
            export,
        } => commands::extract::run(ExtractArgs {
            input_file,
            template,
            preset,
            kind,
            delimiter,
            output,
            records,
            export,
        }),
        Commands::Export {
            records_file,
            output_file,
        } => commands::export::run(records_file, output_file),
        Commands::Summary {
            records_file,
            field,
            group_by,
            output,
        } => commands::summary::run(records_file, &field, group_by.as_deref(), &output),
        Commands::Templates { action } => match action {
            TemplatesAction::List => commands::templates::list(),
            TemplatesAction::Show { preset } => commands::templates::show(&preset),
            TemplatesAction::Schema => commands::templates::schema(),
            TemplatesAction::Validate { file } => commands::templates::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
