use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::{ParseOptions, RowPolicy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// URL or file path of the transaction export.
    #[serde(default)]
    pub source: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub strict_rows: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_delimiter() -> char {
    ';'
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: String::new(),
            delimiter: default_delimiter(),
            strict_rows: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Settings {
    pub fn parse_options(&self) -> Result<ParseOptions> {
        if !self.delimiter.is_ascii() {
            return Err(Error::Settings(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        Ok(ParseOptions {
            delimiter: self.delimiter as u8,
            row_policy: if self.strict_rows {
                RowPolicy::Strict
            } else {
                RowPolicy::Lenient
            },
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// The configured source, unless overridden on the command line.
    pub fn resolve_source(&self, override_source: Option<&str>) -> Result<String> {
        let source = override_source.unwrap_or(&self.source).trim();
        if source.is_empty() {
            return Err(Error::Settings(
                "No source configured\nRun `comprador config --source <URL or path>` or pass --source."
                    .to_string(),
            ));
        }
        Ok(source.to_string())
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("comprador")
}

pub fn settings_path() -> PathBuf {
    std::env::var_os("COMPRADOR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir().join("settings.json"))
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

pub fn load_settings_from(path: &std::path::Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring unreadable settings at {}: {e}", path.display());
            Settings::default()
        })
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(settings, &settings_path())
}

pub fn save_settings_to(settings: &Settings, path: &std::path::Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}
