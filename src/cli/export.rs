use std::path::PathBuf;

use crate::cli::build_controller;
use crate::error::Result;
use crate::models::Field;
use crate::parser::write_payload;
use crate::query::Query;
use crate::settings::load_settings;

pub fn run(term: &str, output: &str, source: Option<&str>) -> Result<()> {
    Query::new(term)?;
    let delimiter = load_settings().parse_options()?.delimiter;
    let controller = build_controller(source)?;
    let dataset = controller.refresh()?;
    let result = controller.search(term)?;

    let columns: &[Field] = if dataset.columns.is_empty() {
        &Field::ALL
    } else {
        &dataset.columns
    };
    let text = write_payload(columns, &result.records, delimiter)?;

    let dest = PathBuf::from(output);
    if let Some(dir) = dest.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&dest, text)?;

    println!("{} row(s) written to {}", result.len(), dest.display());
    Ok(())
}
