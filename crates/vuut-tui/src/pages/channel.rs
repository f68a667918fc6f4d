use vuut_core::LayoutError;
use vuut_core::chat::{Channel, ChannelId, Message, UserId};
use vuut_core::markup::{Markup, PREFIX_SEPARATOR, with_prefix};
use vuut_core::text::{clock_time, truncate_with_ellipsis};

use super::viewport::Viewport;
use super::wrap::wrap_text;

/// Columns kept free to the right of a message body.
const BODY_MARGIN: usize = 8;

/// History the page wants fetched after its first open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRequest {
    pub channel: ChannelId,
    pub limit: usize,
}

/// Output page bound to one chat channel.
///
/// Messages are dropped until the page is opened; opening asks for a
/// history replay, which arrives through the same `process_message` path
/// as live traffic.
#[derive(Debug, Clone)]
pub struct ChannelPage {
    channel: Channel,
    local_user: UserId,
    viewport: Viewport,
    opened: bool,
}

impl ChannelPage {
    pub fn new(channel: Channel, local_user: UserId) -> Self {
        Self {
            channel,
            local_user,
            viewport: Viewport::auto_scrolled(),
            opened: false,
        }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn name(&self) -> &str {
        &self.channel.name
    }

    pub fn is_opened(&self) -> bool {
        self.opened
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Marks the page opened. Only the first call yields a history request.
    pub fn open(&mut self, limit: usize) -> Option<HistoryRequest> {
        if self.opened {
            return None;
        }
        self.opened = true;
        Some(HistoryRequest {
            channel: self.channel.id,
            limit,
        })
    }

    /// Formats `message` and appends it to the viewport.
    pub fn process_message(&mut self, message: &Message, show_timestamp: bool, prefix_len: usize) {
        if !self.opened || message.channel != self.channel.id {
            return;
        }

        for line in self.format_message(message, show_timestamp, prefix_len) {
            self.viewport.add_line(line.into_string());
        }
    }

    pub(crate) fn teardown(&mut self) {
        self.viewport.jump_to_latest();
    }

    fn format_message(
        &self,
        message: &Message,
        show_timestamp: bool,
        prefix_len: usize,
    ) -> Vec<Markup> {
        let clock = if show_timestamp {
            Markup::new(clock_time(message.created_at))
        } else {
            Markup::default()
        };
        let remote = message.author.id != self.local_user;
        let tags: &[&str] = if remote { &["**"] } else { &[] };

        let column = prefix_len.saturating_sub(PREFIX_SEPARATOR.len());
        let mut author = author_markup(&message.author.name, remote);
        if clock.width() + author.width() > column {
            let room = column.saturating_sub(clock.width() + 1);
            author = author_markup(&truncate_with_ellipsis(&message.author.name, room), remote);
        }

        let width = self.viewport.width();
        let body_width = width.saturating_sub(prefix_len + BODY_MARGIN);
        // An unsized page wraps later, on its first resize.
        if width > 0 && body_width == 0 {
            let err = LayoutError {
                needed: prefix_len + BODY_MARGIN + 1,
                available: width,
            };
            tracing::warn!(channel = %self.channel.id, %err, "no room for message body");
            return vec![placeholder(&err, width)];
        }

        wrap_text(&message.content, body_width)
            .into_iter()
            .enumerate()
            .map(|(idx, fragment)| {
                let body = Markup::new(fragment);
                with_prefix(&body, &clock, &author, prefix_len, idx == 0, tags).unwrap_or_else(
                    |err| {
                        tracing::warn!(channel = %self.channel.id, %err, "message line does not fit");
                        placeholder(&err, width)
                    },
                )
            })
            .collect()
    }
}

/// Red error line cut to `width` so the viewport never splits its markers.
fn placeholder(err: &LayoutError, width: usize) -> Markup {
    let text = format!("Cannot render line : {err}");
    let markers = "<r><r>".len();
    if width == 0 {
        Markup::new(format!("<r>{text}<r>"))
    } else if width > markers {
        Markup::new(format!("<r>{}<r>", truncate_with_ellipsis(&text, width - markers)))
    } else {
        Markup::new(truncate_with_ellipsis(&text, width))
    }
}

fn author_markup(name: &str, remote: bool) -> Markup {
    if remote && !name.is_empty() {
        Markup::new(format!("**{name}**"))
    } else {
        Markup::new(name)
    }
}

#[cfg(test)]
mod tests {
    use unicode_width::UnicodeWidthStr;
    use vuut_core::chat::{GuildId, User};
    use vuut_core::markup::strip_markup;

    use super::*;

    const ME: UserId = UserId(1);

    fn general() -> Channel {
        Channel {
            id: ChannelId(1001),
            guild: GuildId(1),
            name: "general".to_string(),
        }
    }

    fn message(author: (u64, &str), content: &str, created_at: i64) -> Message {
        Message {
            channel: ChannelId(1001),
            author: User {
                id: UserId(author.0),
                name: author.1.to_string(),
            },
            content: content.to_string(),
            created_at,
        }
    }

    fn page(width: usize, height: usize) -> ChannelPage {
        let mut page = ChannelPage::new(general(), ME);
        page.viewport_mut().resize(width, height);
        page
    }

    #[test]
    fn test_open_requests_history_once() {
        let mut page = page(80, 10);
        assert_eq!(
            page.open(100),
            Some(HistoryRequest {
                channel: ChannelId(1001),
                limit: 100
            })
        );
        assert!(page.is_opened());
        assert_eq!(page.open(100), None);
    }

    #[test]
    fn test_messages_before_open_are_dropped_then_replayed() {
        let mut page = page(80, 10);
        let history = [
            message((2, "ada"), "first", 100),
            message((3, "grace"), "second", 200),
            message((2, "ada"), "third", 300),
        ];
        for m in &history {
            page.process_message(m, true, 32);
        }
        assert!(page.viewport().lines().is_empty());

        let request = page.open(100);
        assert!(request.is_some());
        for m in &history {
            page.process_message(m, true, 32);
        }

        let lines: Vec<String> = page
            .viewport()
            .lines()
            .iter()
            .map(|l| strip_markup(l).into_owned())
            .collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("ada | first"));
        assert!(lines[1].ends_with("grace | second"));
        assert!(lines[2].ends_with("ada | third"));
    }

    #[test]
    fn test_other_channels_are_ignored() {
        let mut page = page(80, 10);
        page.open(100);
        let mut m = message((2, "ada"), "elsewhere", 100);
        m.channel = ChannelId(1002);
        page.process_message(&m, true, 32);
        assert!(page.viewport().lines().is_empty());
    }

    #[test]
    fn test_remote_author_and_body_are_bold() {
        let mut page = page(80, 10);
        page.open(100);
        page.process_message(&message((2, "ada"), "hi", 0), false, 16);
        page.process_message(&message((1, "me"), "yo", 0), false, 16);

        let lines = page.viewport().lines();
        assert_eq!(lines[0], format!("{}**ada** | **hi**", " ".repeat(10)));
        assert_eq!(lines[1], format!("{}me | yo", " ".repeat(11)));
    }

    #[test]
    fn test_prefix_width_is_exact_and_continuations_align() {
        let mut page = page(40, 20);
        page.open(100);
        // body width = 40 - 16 - 8 = 16
        page.process_message(
            &message((2, "ada"), "one two three four five six seven", 0),
            true,
            16,
        );

        let lines = page.viewport().lines();
        assert!(lines.len() > 1);
        let clock = clock_time(0);
        for (idx, line) in lines.iter().enumerate() {
            let clean = strip_markup(line).into_owned();
            let (prefix, body) = clean.split_once(" | ").unwrap();
            assert_eq!(prefix.width(), 13);
            assert!(body.width() <= 16);
            if idx == 0 {
                assert!(prefix.starts_with(&clock));
                assert!(prefix.ends_with("ada"));
            } else {
                assert!(prefix.trim().is_empty());
            }
        }
    }

    #[test]
    fn test_long_author_is_truncated() {
        let mut page = page(80, 10);
        page.open(100);
        page.process_message(
            &message((2, "a_really_long_display_name"), "hi", 0),
            true,
            20,
        );

        let clean = strip_markup(&page.viewport().lines()[0]).into_owned();
        let (prefix, body) = clean.split_once(" | ").unwrap();
        assert_eq!(prefix.width(), 17);
        assert!(prefix.ends_with('…'));
        assert_eq!(body, "hi");
    }

    #[test]
    fn test_unfittable_prefix_degrades_to_placeholder() {
        let mut page = page(80, 10);
        page.open(100);
        // 8-column clock cannot fit in a 2-column prefix
        page.process_message(&message((2, "ada"), "hi", 0), true, 5);

        let line = &page.viewport().lines()[0];
        assert!(line.starts_with("<r>Cannot render line :"));
    }

    #[test]
    fn test_narrow_page_degrades_each_message_to_one_placeholder() {
        // 38 columns cannot hold a 32-column prefix plus the body margin.
        let mut page = page(38, 20);
        page.open(100);
        page.process_message(
            &message(
                (2, "ada"),
                "one two three four five six seven eight nine ten eleven twelve",
                0,
            ),
            true,
            32,
        );

        let lines = page.viewport().lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(page.viewport().wrapped().len(), 1);
        assert!(lines[0].width() <= 38);
        assert!(lines[0].starts_with("<r>Cannot render line"));
        assert!(lines[0].ends_with("<r>"));
        assert!(!lines[0].contains("**"));
    }

    #[test]
    fn test_placeholder_fits_tiny_widths() {
        let err = LayoutError {
            needed: 41,
            available: 4,
        };
        assert_eq!(placeholder(&err, 4).raw_width(), 4);
        assert!(!placeholder(&err, 4).raw().contains("<r>"));
        assert_eq!(placeholder(&err, 20).raw_width(), 20);
    }

    #[test]
    fn test_teardown_resumes_following() {
        let mut page = page(80, 2);
        page.open(100);
        for i in 0..5 {
            page.process_message(&message((2, "ada"), &format!("m{i}"), 0), false, 16);
        }
        page.viewport_mut().scroll_up();
        assert!(!page.viewport().is_following());
        page.teardown();
        assert!(page.viewport().is_following());
        assert_eq!(page.viewport().head(), 3);
    }
}
