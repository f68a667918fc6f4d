//! Line wrapping for the output viewport.
//!
//! Widths are measured on the raw text, markers included, so a wrapped
//! line never exceeds the column budget even before markup is stripped.

use std::{iter, mem};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wraps `text` to `width` columns, breaking at whitespace.
///
/// Runs of whitespace inside a line are kept as-is (prefix columns rely
/// on that); whitespace at a break point is dropped. Leading whitespace of
/// the first line is kept. Words wider than `width` are split by
/// character. Empty input yields one empty line.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for (chunk, is_space) in chunks(text) {
        let chunk_width = chunk.width();

        if is_space {
            if current.is_empty() && !lines.is_empty() {
                continue;
            }
            if current_width + chunk_width <= width {
                current.push_str(chunk);
                current_width += chunk_width;
            } else if !current.is_empty() {
                lines.push(finish(&mut current));
                current_width = 0;
            }
            continue;
        }

        if current_width + chunk_width <= width {
            current.push_str(chunk);
            current_width += chunk_width;
            continue;
        }

        if !current.trim_end().is_empty() {
            lines.push(finish(&mut current));
        }
        current.clear();
        current_width = 0;

        if chunk_width > width {
            let mut broken = wrap_chars(chunk, width);
            if let Some(last) = broken.pop() {
                lines.extend(broken);
                current_width = last.width();
                current = last;
            }
        } else {
            current.push_str(chunk);
            current_width = chunk_width;
        }
    }

    if !current.trim_end().is_empty() {
        lines.push(finish(&mut current));
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Breaks a string into parts that fit within `width` display columns.
///
/// Breaks at character boundaries; zero-width characters stay attached to
/// the preceding part.
pub fn wrap_chars(text: &str, width: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_width: usize = 0;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);

        if current_width + ch_width > width && !current.is_empty() {
            parts.push(mem::take(&mut current));
            current_width = 0;
        }

        current.push(ch);
        current_width += ch_width;
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

fn finish(current: &mut String) -> String {
    let line = current.trim_end().to_string();
    current.clear();
    line
}

/// Splits text into alternating runs of whitespace and non-whitespace.
fn chunks(text: &str) -> impl Iterator<Item = (&str, bool)> {
    let mut rest = text;
    iter::from_fn(move || {
        let first = rest.chars().next()?;
        let is_space = first.is_whitespace();
        let end = rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() != is_space)
            .map_or(rest.len(), |(idx, _)| idx);
        let (chunk, tail) = rest.split_at(end);
        rest = tail;
        Some((chunk, is_space))
    })
}
