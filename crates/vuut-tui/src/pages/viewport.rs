//! Scrollable window over wrapped lines.

use super::wrap::wrap_text;

/// How the scroll head reacts to new content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMode {
    /// The head only moves when the user scrolls.
    Manual,
    /// New lines pin the head to the bottom while following.
    AutoScroll { follow_latest: bool },
}

/// Logical lines, their wrapped form, and a scroll head.
///
/// `head` indexes the wrapped lines and always satisfies
/// `head <= max(0, wrapped.len() - height)`.
#[derive(Debug, Clone)]
pub struct Viewport {
    lines: Vec<String>,
    wrapped: Vec<String>,
    width: usize,
    height: usize,
    head: usize,
    mode: ScrollMode,
}

impl Viewport {
    pub fn new(mode: ScrollMode) -> Self {
        Self {
            lines: Vec::new(),
            wrapped: Vec::new(),
            width: 0,
            height: 0,
            head: 0,
            mode,
        }
    }

    /// A viewport that follows new content until scrolled away from.
    pub fn auto_scrolled() -> Self {
        Self::new(ScrollMode::AutoScroll {
            follow_latest: true,
        })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn wrapped(&self) -> &[String] {
        &self.wrapped
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn mode(&self) -> ScrollMode {
        self.mode
    }

    pub fn is_following(&self) -> bool {
        matches!(
            self.mode,
            ScrollMode::AutoScroll {
                follow_latest: true
            }
        )
    }

    pub fn max_head(&self) -> usize {
        self.wrapped.len().saturating_sub(self.height)
    }

    /// Appends a logical line. Only the new line is wrapped.
    pub fn add_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        self.wrapped.extend(wrap_text(&line, self.width));
        self.lines.push(line);

        if self.is_following() {
            self.head = self.max_head();
        }
    }

    /// Applies new inner dimensions.
    ///
    /// On a width change the head is remapped so that it points at roughly
    /// the same character offset as before, then everything is re-wrapped.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.height = height;

        if width != self.width {
            let old_width = self.width;
            self.width = width;
            self.head = remap_head(self.head, old_width, width);
            self.rewrap();
        }

        if self.is_following() {
            self.head = self.max_head();
        } else {
            self.clamp();
        }
    }

    pub fn scroll_up(&mut self) {
        self.head = self.head.saturating_sub(1);
        if let ScrollMode::AutoScroll { follow_latest } = &mut self.mode {
            *follow_latest = false;
        }
    }

    pub fn scroll_down(&mut self) {
        let max = self.max_head();
        self.head = (self.head + 1).min(max);
        if let ScrollMode::AutoScroll { follow_latest } = &mut self.mode
            && self.head == max
        {
            *follow_latest = true;
        }
    }

    /// Moves the head to the bottom and resumes following.
    pub fn jump_to_latest(&mut self) {
        self.head = self.max_head();
        if let ScrollMode::AutoScroll { follow_latest } = &mut self.mode {
            *follow_latest = true;
        }
    }

    /// The visible window, at most `height` wrapped lines.
    pub fn visible(&self) -> &[String] {
        let start = self.head.min(self.wrapped.len());
        let end = (start + self.height).min(self.wrapped.len());
        &self.wrapped[start..end]
    }

    /// The visible window joined with newlines.
    pub fn renderable(&self) -> String {
        self.visible().join("\n")
    }

    /// Drops all content and returns to the top (following again, if
    /// auto-scrolled).
    pub fn clear(&mut self) {
        self.lines.clear();
        self.wrapped.clear();
        self.head = 0;
        if let ScrollMode::AutoScroll { follow_latest } = &mut self.mode {
            *follow_latest = true;
        }
    }

    fn rewrap(&mut self) {
        self.wrapped = self
            .lines
            .iter()
            .flat_map(|line| wrap_text(line, self.width))
            .collect();
    }

    fn clamp(&mut self) {
        self.head = self.head.min(self.max_head());
    }
}

/// Maps a head from one wrap width to another through a character offset.
///
/// A non-zero offset is bumped by one before dividing, and a non-zero
/// result is stepped back by one.
fn remap_head(head: usize, old_width: usize, new_width: usize) -> usize {
    if new_width == 0 {
        return 0;
    }
    let mut offset = head * old_width;
    if offset > 0 {
        offset += 1;
    }
    offset.div_ceil(new_width).saturating_sub(1)
}
