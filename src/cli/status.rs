use colored::Colorize;

use crate::cli::build_controller;
use crate::error::Result;
use crate::fmt::captured_at;
use crate::settings::{load_settings, settings_path};

pub fn run(source: Option<&str>) -> Result<()> {
    let settings = load_settings();

    println!("Settings:   {}", settings_path().display());
    let shown = source.unwrap_or(&settings.source);
    println!("Source:     {}", if shown.is_empty() { "(not set)" } else { shown });
    println!("Delimiter:  {:?}", settings.delimiter);
    println!("Rows:       {}", if settings.strict_rows { "strict" } else { "lenient" });
    println!("Timeout:    {}s", settings.timeout_secs);

    let controller = build_controller(source)?;
    if let Err(e) = controller.refresh() {
        log::debug!("status refresh failed: {e}");
    }
    let status = controller.status();

    println!();
    println!("State:      {}", status.state);
    if let Some(err) = &status.last_error {
        println!("Error:      {}", err.red());
    }
    println!("Loaded:     {}", captured_at(status.captured_at));
    if let Some(count) = status.record_count {
        println!("Records:    {count}");
        println!("Skipped:    {}", status.skipped_rows);
    }
    if let Some(dataset) = controller.current() {
        let columns: Vec<&str> = dataset.columns.iter().map(|f| f.header()).collect();
        println!("Columns:    {}", columns.join(", "));
    }

    Ok(())
}
