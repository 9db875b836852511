use chrono::{DateTime, Local};

/// Capture time as shown to the operator, or "not yet loaded".
pub fn captured_at(ts: Option<DateTime<Local>>) -> String {
    match ts {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "not yet loaded".to_string(),
    }
}

/// Show empty cells as a dash so table columns stay readable.
pub fn cell(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
