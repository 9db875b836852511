use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path};

pub fn run(
    source: Option<String>,
    delimiter: Option<char>,
    strict: bool,
    lenient: bool,
    timeout: Option<u64>,
) -> Result<()> {
    let mut settings = load_settings();
    let changed = source.is_some() || delimiter.is_some() || strict || lenient || timeout.is_some();

    if let Some(source) = source {
        settings.source = source.trim().to_string();
    }
    if let Some(delimiter) = delimiter {
        settings.delimiter = delimiter;
    }
    if strict {
        settings.strict_rows = true;
    }
    if lenient {
        settings.strict_rows = false;
    }
    if let Some(timeout) = timeout {
        settings.timeout_secs = timeout;
    }

    if changed {
        // Refuse to save a delimiter the parser cannot use
        settings.parse_options()?;
        save_settings(&settings)?;
        println!("Saved {}", settings_path().display());
    }

    println!("source:       {}", if settings.source.is_empty() { "(not set)" } else { &settings.source });
    println!("delimiter:    {:?}", settings.delimiter);
    println!("strict_rows:  {}", settings.strict_rows);
    println!("timeout_secs: {}", settings.timeout_secs);
    Ok(())
}
