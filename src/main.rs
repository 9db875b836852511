mod cli;
mod controller;
mod error;
mod fmt;
mod models;
mod parser;
mod query;
mod settings;
mod source;
mod store;

use clap::Parser;
use env_logger::Env;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    // RUST_LOG still wins over --debug
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env).init();

    let result = match cli.command {
        Commands::Search {
            term,
            source,
            all_fields,
        } => cli::search::run(&term, source.as_deref(), all_fields),
        Commands::Shell { source, every } => cli::shell::run(source.as_deref(), every),
        Commands::Status { source } => cli::status::run(source.as_deref()),
        Commands::Export {
            term,
            output,
            source,
        } => cli::export::run(&term, &output, source.as_deref()),
        Commands::Config {
            source,
            delimiter,
            strict,
            lenient,
            timeout,
        } => cli::config::run(source, delimiter, strict, lenient, timeout),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
