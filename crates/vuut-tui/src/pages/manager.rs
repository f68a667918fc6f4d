use std::collections::HashMap;

use vuut_core::chat::{ChannelId, Message};

use super::Page;
use super::channel::ChannelPage;

/// Index of a page inside the [`PageManager`].
pub type PageId = usize;

#[derive(Debug)]
struct Slot {
    page: Page,
    parent: Option<PageId>,
}

/// Owns every page, tracks focus, and routes messages by channel.
#[derive(Debug, Default)]
pub struct PageManager {
    slots: Vec<Slot>,
    by_channel: HashMap<ChannelId, PageId>,
    focus: Option<PageId>,
    /// Last output size, applied to pages added later.
    size: (usize, usize),
}

impl PageManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page; channel pages become message routing targets.
    pub fn add_page(&mut self, page: impl Into<Page>, parent: Option<PageId>) -> PageId {
        let mut page = page.into();
        let (width, height) = self.size;
        page.viewport_mut().resize(width, height);
        let id = self.slots.len();
        if let Page::Channel(channel) = &page {
            self.by_channel.insert(channel.channel().id, id);
        }
        self.slots.push(Slot { page, parent });
        id
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, id: PageId) -> Option<&Page> {
        self.slots.get(id).map(|slot| &slot.page)
    }

    pub fn get_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.slots.get_mut(id).map(|slot| &mut slot.page)
    }

    pub fn pages(&self) -> impl Iterator<Item = (PageId, &Page)> {
        self.slots.iter().enumerate().map(|(id, slot)| (id, &slot.page))
    }

    pub fn parent(&self, id: PageId) -> Option<PageId> {
        self.slots.get(id).and_then(|slot| slot.parent)
    }

    pub fn focus(&self) -> Option<PageId> {
        self.focus
    }

    pub fn focused(&self) -> Option<&Page> {
        self.focus.and_then(|id| self.get(id))
    }

    pub fn focused_mut(&mut self) -> Option<&mut Page> {
        self.focus.and_then(|id| self.get_mut(id))
    }

    /// The focused page, if it is a channel page.
    pub fn focused_channel(&self) -> Option<&ChannelPage> {
        self.focused().and_then(Page::as_channel)
    }

    pub fn channel_page(&self, channel: ChannelId) -> Option<PageId> {
        self.by_channel.get(&channel).copied()
    }

    pub fn channel_page_mut(&mut self, channel: ChannelId) -> Option<&mut ChannelPage> {
        let id = self.channel_page(channel)?;
        self.get_mut(id).and_then(Page::as_channel_mut)
    }

    /// Moves focus to `id`, tearing down the previously focused page.
    ///
    /// Unknown ids and re-focusing the current page are no-ops.
    pub fn set_focus(&mut self, id: PageId) {
        if id >= self.slots.len() || self.focus == Some(id) {
            return;
        }
        if let Some(previous) = self.focused_mut() {
            previous.teardown();
        }
        tracing::debug!(page = id, name = self.slots[id].page.name(), "focus changed");
        self.focus = Some(id);
    }

    /// Routes a message to the channel page it belongs to, if any.
    pub fn process_message(&mut self, message: &Message, show_timestamp: bool, prefix_len: usize) {
        if let Some(page) = self.channel_page_mut(message.channel) {
            page.process_message(message, show_timestamp, prefix_len);
        }
    }

    /// Returns to the focused page's parent, or closes it when it has none.
    ///
    /// Returns the newly focused page.
    pub fn handle_back(&mut self) -> Option<PageId> {
        let current = self.focus?;
        match self.parent(current) {
            Some(parent) => self.set_focus(parent),
            None => {
                if let Some(page) = self.focused_mut() {
                    page.teardown();
                }
                tracing::debug!(page = current, "page closed");
                self.focus = None;
            }
        }
        self.focus
    }

    /// Applies the output region's inner size to every page.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.size = (width, height);
        for slot in &mut self.slots {
            slot.page.viewport_mut().resize(width, height);
        }
    }
}
