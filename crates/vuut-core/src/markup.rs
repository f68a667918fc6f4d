//! Inline markup carried by every rendered line.
//!
//! Lines are plain strings with paired style markers:
//!
//! | Marker        | Style       |
//! |---------------|-------------|
//! | `**text**`    | bold        |
//! | `*text*`      | dim         |
//! | `` `text` ``  | reverse     |
//! | `_text_`      | underline   |
//! | `<g>text<g>`  | green       |
//! | `<r>text<r>`  | red         |
//! | `<y>text<y>`  | yellow      |
//!
//! Layout math always works on the *display* width, i.e. the width after
//! every marker pair has been stripped.

use std::borrow::Cow;
use std::fmt;
use std::ops::{Add, AddAssign};
use std::sync::LazyLock;

use regex::Regex;
use unicode_width::UnicodeWidthStr;

use crate::error::LayoutError;

/// Separator placed between the prefix column and the message body.
pub const PREFIX_SEPARATOR: &str = " | ";

/// Visual style attached to a marker pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupStyle {
    Bold,
    Dim,
    Reverse,
    Underline,
    Green,
    Red,
    Yellow,
}

/// Marker patterns in match-priority order.
static PATTERNS: LazyLock<Vec<(Regex, MarkupStyle)>> = LazyLock::new(|| {
    [
        (r"\*\*(.+?)\*\*", MarkupStyle::Bold),
        (r"\*(.+?)\*", MarkupStyle::Dim),
        (r"`(.+?)`", MarkupStyle::Reverse),
        (r"_(.+?)_", MarkupStyle::Underline),
        (r"<g>(.+?)<g>", MarkupStyle::Green),
        (r"<r>(.+?)<r>", MarkupStyle::Red),
        (r"<y>(.+?)<y>", MarkupStyle::Yellow),
    ]
    .into_iter()
    .map(|(pattern, style)| {
        (Regex::new(pattern).expect("static markup pattern"), style)
    })
    .collect()
});

/// Removes every marker pair from `text`, keeping the wrapped content.
///
/// Each pattern class is applied once, in priority order.
pub fn strip_markup(text: &str) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(text);
    for (regex, _) in PATTERNS.iter() {
        if regex.is_match(&out) {
            out = Cow::Owned(regex.replace_all(&out, "$1").into_owned());
        }
    }
    out
}

/// Display width of `text` once markers are stripped.
pub fn display_width(text: &str) -> usize {
    strip_markup(text).width()
}

/// A run of text and the style that applies to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub style: Option<MarkupStyle>,
}

/// Splits a line into styled segments.
///
/// Repeatedly picks the earliest marker match (ties go to the pattern
/// listed first), emits the text before it unstyled, then the match
/// content with its style.
pub fn segments(line: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut rest = line;

    while !rest.is_empty() {
        let earliest = PATTERNS
            .iter()
            .filter_map(|(regex, style)| regex.captures(rest).map(|caps| (caps, *style)))
            .min_by_key(|(caps, _)| caps.get(0).map_or(usize::MAX, |m| m.start()));

        let Some((caps, style)) = earliest else {
            out.push(Segment {
                text: rest.to_string(),
                style: None,
            });
            break;
        };

        let (Some(whole), Some(content)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        if whole.start() > 0 {
            out.push(Segment {
                text: rest[..whole.start()].to_string(),
                style: None,
            });
        }
        out.push(Segment {
            text: content.as_str().to_string(),
            style: Some(style),
        });
        rest = &rest[whole.end()..];
    }

    out
}

/// Immutable line of marked-up text with its display width precomputed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    raw: String,
    width: usize,
}

impl Markup {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let width = display_width(&raw);
        Self { raw, width }
    }

    /// Text including markers.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Width including markers.
    pub fn raw_width(&self) -> usize {
        self.raw.width()
    }

    /// Width after markers are stripped.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Text with markers stripped.
    pub fn clean(&self) -> String {
        strip_markup(&self.raw).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Wraps the text in `tags`, opening in order and closing in reverse.
    pub fn wrapped_in(&self, tags: &[&str]) -> Self {
        if tags.is_empty() {
            return self.clone();
        }
        let mut raw = tags.concat();
        raw.push_str(&self.raw);
        for tag in tags.iter().rev() {
            raw.push_str(tag);
        }
        Self::new(raw)
    }

    pub fn into_string(self) -> String {
        self.raw
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Markup {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Markup {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for Markup {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl AddAssign<&str> for Markup {
    fn add_assign(&mut self, rhs: &str) {
        self.raw.push_str(rhs);
        // Markers may pair across the boundary.
        self.width = display_width(&self.raw);
    }
}

impl AddAssign<&Markup> for Markup {
    fn add_assign(&mut self, rhs: &Markup) {
        *self += rhs.raw.as_str();
    }
}

impl Add<&str> for Markup {
    type Output = Markup;

    fn add(mut self, rhs: &str) -> Markup {
        self += rhs;
        self
    }
}

impl Add<&Markup> for Markup {
    type Output = Markup;

    fn add(mut self, rhs: &Markup) -> Markup {
        self += rhs;
        self
    }
}

/// Places `left` and `right` at opposite ends of an `n`-column field.
pub fn lr_justified(left: &Markup, right: &Markup, n: usize) -> Result<Markup, LayoutError> {
    let used = left.width() + right.width();
    if used > n {
        return Err(LayoutError {
            needed: used,
            available: n,
        });
    }

    let gap = " ".repeat(n - used);
    Ok(left.clone() + gap.as_str() + right)
}

/// Builds one display line of a chat message.
///
/// `prefix_len` covers the timestamp/author column *and* the
/// [`PREFIX_SEPARATOR`]. Continuation lines (`is_first_line == false`)
/// blank out the prefix so the body stays aligned.
pub fn with_prefix(
    body: &Markup,
    created_at: &Markup,
    author: &Markup,
    prefix_len: usize,
    is_first_line: bool,
    tags: &[&str],
) -> Result<Markup, LayoutError> {
    let column = prefix_len.saturating_sub(PREFIX_SEPARATOR.len());
    let mut prefix = lr_justified(created_at, author, column)?;
    if !is_first_line {
        prefix = Markup::new(" ".repeat(prefix.width()));
    }

    Ok(prefix + PREFIX_SEPARATOR + &body.wrapped_in(tags))
}
