//! Pages shown in the output region.
//!
//! A page owns a [`Viewport`]; the [`PageManager`] decides which page has
//! focus and routes inbound chat messages to the matching channel page.

mod channel;
mod manager;
mod viewport;
mod wrap;

pub use channel::{ChannelPage, HistoryRequest};
pub use manager::{PageId, PageManager};
pub use viewport::{ScrollMode, Viewport};
pub use wrap::{wrap_chars, wrap_text};

/// A page of free text, used for the scratch page and command output.
#[derive(Debug, Clone)]
pub struct ScrollPage {
    name: String,
    viewport: Viewport,
}

impl ScrollPage {
    /// A page seeded with `text`, one logical line per `\n`.
    pub fn new(name: impl Into<String>, text: &str) -> Self {
        let mut viewport = Viewport::new(ScrollMode::Manual);
        for line in text.split('\n') {
            viewport.add_line(line);
        }
        Self {
            name: name.into(),
            viewport,
        }
    }

    /// An empty page that follows new output.
    pub fn auto(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            viewport: Viewport::auto_scrolled(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Page {
    Scroll(ScrollPage),
    Channel(ChannelPage),
}

impl Page {
    pub fn name(&self) -> &str {
        match self {
            Page::Scroll(page) => &page.name,
            Page::Channel(page) => page.name(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        match self {
            Page::Scroll(page) => &page.viewport,
            Page::Channel(page) => page.viewport(),
        }
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        match self {
            Page::Scroll(page) => &mut page.viewport,
            Page::Channel(page) => page.viewport_mut(),
        }
    }

    pub fn add_line(&mut self, line: impl Into<String>) {
        self.viewport_mut().add_line(line);
    }

    pub fn as_channel(&self) -> Option<&ChannelPage> {
        match self {
            Page::Channel(page) => Some(page),
            Page::Scroll(_) => None,
        }
    }

    pub fn as_channel_mut(&mut self) -> Option<&mut ChannelPage> {
        match self {
            Page::Channel(page) => Some(page),
            Page::Scroll(_) => None,
        }
    }

    /// Runs when the page loses focus.
    pub fn teardown(&mut self) {
        if let Page::Channel(page) = self {
            page.teardown();
        }
    }
}

impl From<ScrollPage> for Page {
    fn from(page: ScrollPage) -> Self {
        Page::Scroll(page)
    }
}

impl From<ChannelPage> for Page {
    fn from(page: ChannelPage) -> Self {
        Page::Channel(page)
    }
}
