//! Status modal shown above the output region.
//!
//! A [`Modal`] is a fixed stack of [`ModalLine`]s. Each line has a left,
//! center, and right slot; [`ModalLine::render`] lays them out into an
//! exact-width string, dropping slots that do not fit.

use std::time::{Duration, Instant};

use crate::markup::display_width;

/// Addresses one of the three slots of a modal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalSlot {
    Left,
    Center,
    Right,
}

impl ModalSlot {
    pub const ALL: [ModalSlot; 3] = [ModalSlot::Left, ModalSlot::Center, ModalSlot::Right];

    fn index(self) -> usize {
        match self {
            ModalSlot::Left => 0,
            ModalSlot::Center => 1,
            ModalSlot::Right => 2,
        }
    }
}

/// One modal row with three markup fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalLine {
    slots: [String; 3],
}

impl ModalLine {
    pub fn new(left: impl Into<String>, center: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            slots: [left.into(), center.into(), right.into()],
        }
    }

    pub fn get(&self, slot: ModalSlot) -> &str {
        &self.slots[slot.index()]
    }

    pub fn set(&mut self, slot: ModalSlot, text: impl Into<String>) {
        self.slots[slot.index()] = text.into();
    }

    /// Lays the fragments out into exactly `n` display columns.
    ///
    /// While the fragments do not leave at least one free column, one is
    /// dropped: the center first, then the last remaining one, until none
    /// are left. Evaluated from scratch on every call.
    pub fn render(&self, n: usize) -> String {
        let mut elements: Vec<&str> = self.slots.iter().map(String::as_str).collect();

        while elements.iter().map(|e| display_width(e)).sum::<usize>() >= n {
            match elements.len() {
                3 => {
                    elements.remove(1);
                }
                2 => {
                    elements.pop();
                }
                _ => {
                    elements.clear();
                    break;
                }
            }
        }

        let used: usize = elements.iter().map(|e| display_width(e)).sum();
        let free = n.saturating_sub(used);

        match elements.as_slice() {
            [] => " ".repeat(n),
            [only] => {
                let left = free / 2;
                format!("{}{only}{}", " ".repeat(left), " ".repeat(free - left))
            }
            [left, right] => format!("{left}{}{right}", " ".repeat(free)),
            [left, center, right, ..] => {
                let gap1 = free / 2;
                let gap2 = free - gap1;
                format!(
                    "{left}{}{center}{}{right}",
                    " ".repeat(gap1),
                    " ".repeat(gap2)
                )
            }
        }
    }
}

/// A fixed number of modal lines, with optional per-slot expiry.
#[derive(Debug, Clone)]
pub struct Modal {
    lines: Vec<ModalLine>,
    expires: Vec<[Option<Instant>; 3]>,
}

impl Modal {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: vec![ModalLine::default(); max_lines],
            expires: vec![[None; 3]; max_lines],
        }
    }

    pub fn lines(&self) -> &[ModalLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Replaces one slot; with a timeout the slot clears itself later.
    pub fn set(&mut self, line: usize, slot: ModalSlot, text: impl Into<String>, timeout: Option<Duration>) {
        self.set_at(line, slot, text, timeout, Instant::now());
    }

    pub(crate) fn set_at(
        &mut self,
        line: usize,
        slot: ModalSlot,
        text: impl Into<String>,
        timeout: Option<Duration>,
        now: Instant,
    ) {
        let Some(target) = self.lines.get_mut(line) else {
            tracing::warn!(line, "modal line out of range");
            return;
        };
        target.set(slot, text);
        self.expires[line][slot.index()] = timeout.map(|t| now + t);
    }

    /// Replaces a whole line; the timeout applies to all three slots.
    pub fn set_line(&mut self, line: usize, modal_line: ModalLine, timeout: Option<Duration>) {
        let Some(target) = self.lines.get_mut(line) else {
            tracing::warn!(line, "modal line out of range");
            return;
        };
        *target = modal_line;
        let deadline = timeout.map(|t| Instant::now() + t);
        self.expires[line] = [deadline; 3];
    }

    pub fn get(&self, line: usize, slot: ModalSlot) -> Option<&str> {
        self.lines.get(line).map(|l| l.get(slot))
    }

    pub fn get_line(&self, line: usize) -> Option<&ModalLine> {
        self.lines.get(line)
    }

    /// Clears every slot whose deadline is at or before `now`.
    pub fn on_screen_update(&mut self, now: Instant) {
        for (line, deadlines) in self.lines.iter_mut().zip(self.expires.iter_mut()) {
            for slot in ModalSlot::ALL {
                let deadline = &mut deadlines[slot.index()];
                if deadline.is_some_and(|d| now >= d) {
                    line.set(slot, "");
                    *deadline = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(l: &str, c: &str, r: &str) -> ModalLine {
        ModalLine::new(l, c, r)
    }

    #[test]
    fn test_render_three_fragments_split_gaps() {
        // 1 + 1 + 1 used, 7 free -> gaps 3 and 4
        assert_eq!(line("a", "b", "c").render(10), "a   b    c");
    }

    #[test]
    fn test_render_drops_center_first() {
        // 4 + 4 + 4 = 12 >= 10, drop center -> 8 < 10
        assert_eq!(line("left", "mid!", "rght").render(10), "left  rght");
    }

    #[test]
    fn test_render_drops_right_after_center() {
        assert_eq!(line("left", "mid!", "right").render(8), "  left  ");
    }

    #[test]
    fn test_render_exact_fit_is_dropped() {
        // A single fragment filling the whole width still gets dropped.
        assert_eq!(line("abcd", "", "").render(4), "    ");
    }

    #[test]
    fn test_render_single_fragment_centered_floor_left() {
        let mut l = ModalLine::default();
        l.set(ModalSlot::Left, "ab");
        l.set(ModalSlot::Right, "0123456789");
        // left + right = 12 >= 11: center dropped, then right dropped.
        assert_eq!(l.render(11), "    ab     ");
    }

    #[test]
    fn test_render_ignores_markup_width() {
        let out = line("", "<g>Vuut<g>", "").render(10);
        assert_eq!(display_width(&out), 10);
        assert!(out.contains("<g>Vuut<g>"));
    }

    #[test]
    fn test_render_always_exact_width() {
        let samples = ["", "x", "**bold**", "a much longer fragment", "<r>err<r>"];
        for n in 0..30 {
            for l in samples {
                for c in samples {
                    for r in samples {
                        let out = line(l, c, r).render(n);
                        assert_eq!(display_width(&out), n, "{l:?} {c:?} {r:?} at {n}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_render_zero_width() {
        assert_eq!(line("", "", "").render(0), "");
    }

    #[test]
    fn test_modal_set_and_expire() {
        let mut modal = Modal::new(3);
        let now = Instant::now();
        modal.set_at(1, ModalSlot::Center, "saved", Some(Duration::from_secs(5)), now);
        modal.set_at(1, ModalSlot::Left, "sticky", None, now);

        modal.on_screen_update(now + Duration::from_secs(4));
        assert_eq!(modal.get(1, ModalSlot::Center), Some("saved"));

        modal.on_screen_update(now + Duration::from_secs(5));
        assert_eq!(modal.get(1, ModalSlot::Center), Some(""));
        assert_eq!(modal.get(1, ModalSlot::Left), Some("sticky"));
    }

    #[test]
    fn test_modal_out_of_range_is_ignored() {
        let mut modal = Modal::new(1);
        modal.set(5, ModalSlot::Left, "nope", None);
        assert_eq!(modal.get(5, ModalSlot::Left), None);
        assert_eq!(modal.len(), 1);
    }

    #[test]
    fn test_modal_set_line_replaces_all_slots() {
        let mut modal = Modal::new(2);
        modal.set_line(0, line("a", "b", "c"), None);
        assert_eq!(modal.get_line(0), Some(&line("a", "b", "c")));
    }
}
