use chrono::{DateTime, FixedOffset};
use std::borrow::Cow;

const ELLIPSIS: &str = "...";

/// Truncates `text` to at most `max_len` characters, appending `...` when
/// anything was cut.
pub fn truncate_text(text: &str, max_len: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_len) {
        None => text.into(),
        Some((end, _)) => format!("{}{ELLIPSIS}", &text[..end]).into(),
    }
}

/// Parses a Jira timestamp.
///
/// Jira emits `2025-07-01T10:05:00.000+0000`, which is not RFC 3339 because
/// of the offset, so both forms are accepted.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(ts)
        .or_else(|_| DateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}

/// Formats a timestamp for the console, e.g. `Jul 1, 2025, 10:05 AM`.
///
/// The timestamp keeps its own offset. Unparseable input is returned as is.
pub fn format_date(ts: &str) -> String {
    match parse_timestamp(ts) {
        Some(date) => date.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => ts.to_string(),
    }
}
