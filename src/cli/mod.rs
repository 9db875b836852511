pub mod config;
pub mod export;
pub mod search;
pub mod shell;
pub mod status;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::controller::RefreshController;
use crate::error::Result;
use crate::fmt;
use crate::models::Field;
use crate::query::QueryResult;
use crate::settings::load_settings;
use crate::source::source_from_location;
use crate::store::DatasetStore;

#[derive(Parser)]
#[command(
    name = "comprador",
    about = "Find a purchaser's reference code and name in the transaction export."
)]
pub struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the export once and search it by purchaser e-mail.
    Search {
        /// E-mail or part of it (case-insensitive)
        term: String,
        /// URL or file path (default: configured source)
        #[arg(long)]
        source: Option<String>,
        /// Show every column instead of the summary
        #[arg(long = "all-fields")]
        all_fields: bool,
    },
    /// Interactive lookup: type a term to search, :r to refresh, :q to quit.
    Shell {
        #[arg(long)]
        source: Option<String>,
        /// Refresh every N seconds in the background
        #[arg(long)]
        every: Option<u64>,
    },
    /// Show settings, refresh once and report the loaded dataset.
    Status {
        #[arg(long)]
        source: Option<String>,
    },
    /// Write the rows matching a term to a delimited file.
    Export {
        term: String,
        /// Output file path
        #[arg(long)]
        output: String,
        #[arg(long)]
        source: Option<String>,
    },
    /// View or change saved settings.
    Config {
        /// URL or file path of the export
        #[arg(long)]
        source: Option<String>,
        /// Field delimiter (single ASCII character)
        #[arg(long)]
        delimiter: Option<char>,
        /// Skip rows whose cell count differs from the header
        #[arg(long, conflicts_with = "lenient")]
        strict: bool,
        /// Pad short rows and drop extra cells (default)
        #[arg(long)]
        lenient: bool,
        /// HTTP timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

/// Build a controller over the configured (or overridden) source.
pub(crate) fn build_controller(source: Option<&str>) -> Result<RefreshController> {
    let settings = load_settings();
    let location = settings.resolve_source(source)?;
    let options = settings.parse_options()?;
    let source = source_from_location(&location, settings.timeout())?;
    Ok(RefreshController::new(
        source,
        Arc::new(DatasetStore::new()),
        options,
    ))
}

const SUMMARY_FIELDS: [Field; 6] = [
    Field::ReferenceCode,
    Field::PurchaserName,
    Field::PurchaserEmail,
    Field::TransactionDate,
    Field::Status,
    Field::GrossValue,
];

pub(crate) fn print_result(result: &QueryResult, all_fields: bool) {
    if result.is_empty() {
        println!(
            "{}",
            format!("No {} matches \"{}\".", result.query.field(), result.query.term()).yellow()
        );
        return;
    }

    if all_fields {
        for (i, record) in result.records.iter().enumerate() {
            let mut table = Table::new();
            table.set_header(vec!["Field", "Value"]);
            for field in Field::ALL {
                table.add_row(vec![Cell::new(field.header()), Cell::new(fmt::cell(record.get(field)))]);
            }
            println!("Match {} of {}\n{table}\n", i + 1, result.len());
        }
    } else {
        let mut table = Table::new();
        table.set_header(SUMMARY_FIELDS.iter().map(|f| f.header()).collect::<Vec<_>>());
        for record in &result.records {
            table.add_row(
                SUMMARY_FIELDS
                    .iter()
                    .map(|f| Cell::new(fmt::cell(record.get(*f))))
                    .collect::<Vec<_>>(),
            );
        }
        println!("{table}");
    }

    println!(
        "{} match(es) for \"{}\" (data as of {})",
        result.len().to_string().green().bold(),
        result.query.term(),
        fmt::captured_at(Some(result.captured_at))
    );
}
