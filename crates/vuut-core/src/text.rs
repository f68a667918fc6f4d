//! Text utilities shared by the layout and render paths.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncates a string with ellipsis if it exceeds `max_width` (unicode-aware).
///
/// Uses unicode width for accurate terminal column calculation, handling
/// wide characters (CJK, emoji) correctly.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    if max_width == 1 {
        return "…".to_string();
    }
    let mut truncated = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let next_width = width + ch.width().unwrap_or(0);
        if next_width + 1 > max_width {
            break;
        }
        truncated.push(ch);
        width = next_width;
    }
    truncated.push('…');
    truncated
}

/// Keeps the last `max_width` columns of `text`.
///
/// Used by the input region, which always shows the tail of the buffer.
pub fn tail_columns(text: &str, max_width: usize) -> &str {
    let mut width = 0;
    let mut start = text.len();
    for (idx, ch) in text.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width {
            break;
        }
        width += w;
        start = idx;
    }
    &text[start..]
}

/// Formats an epoch timestamp as `HH:MM:SS` in the local timezone.
pub fn clock_time(timestamp: i64) -> String {
    clock_time_in(timestamp, &Local)
}

/// Formats an epoch timestamp as `HH:MM:SS` in `tz`.
pub fn clock_time_in<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    format_timestamp(timestamp, tz, "%H:%M:%S")
}

fn format_timestamp<Tz: TimeZone>(timestamp: i64, tz: &Tz, fmt: &str) -> String
where
    Tz::Offset: Display,
{
    DateTime::from_timestamp(timestamp, 0)
        .map(|utc| utc.with_timezone(tz).format(fmt).to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}
