//! Formatting utilities.

use chrono::NaiveDateTime;

use crate::inference::UNTITLED_DOCUMENT;

/// Label shown for a missing date.
pub const NOT_SET: &str = "Not set";

/// Title to show for a document, never empty.
pub fn display_title(title: &str) -> &str {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        UNTITLED_DOCUMENT
    } else {
        trimmed
    }
}

/// Format an optional date as `YYYY/MM/DD`.
pub fn format_date(date: Option<NaiveDateTime>) -> String {
    match date {
        Some(d) => d.format("%Y/%m/%d").to_string(),
        None => NOT_SET.to_string(),
    }
}

/// Format an optional date with time as `YYYY/MM/DD HH:MM`.
pub fn format_date_time(date: Option<NaiveDateTime>) -> String {
    match date {
        Some(d) => d.format("%Y/%m/%d %H:%M").to_string(),
        None => NOT_SET.to_string(),
    }
}

/// Format a deadline relative to `now`, e.g. `Due: 2026/03/15 (in 2 days)`.
pub fn format_due(deadline: Option<NaiveDateTime>, now: NaiveDateTime) -> String {
    let Some(deadline) = deadline else {
        return format!("Due: {}", NOT_SET);
    };
    let days = (deadline.date() - now.date()).num_days();
    let relative = match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        d if d > 1 => format!("in {} days", d),
        d => format!("{} days overdue", -d),
    };
    format!("Due: {} ({})", format_date(Some(deadline)), relative)
}
