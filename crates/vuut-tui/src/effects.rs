//! UI effect types.
//!
//! Effects are returned by the reducer and executed by the runtime. They
//! cover I/O and task spawning only; the reducer never talks to the
//! platform directly.

use vuut_core::chat::ChannelId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Send `content` to `channel` on the platform.
    SendMessage { channel: ChannelId, content: String },

    /// Fetch the last `limit` messages of `channel` and post them back as
    /// `UiEvent::HistoryMessage`, oldest first.
    ReplayHistory { channel: ChannelId, limit: usize },

    /// Show a desktop notification.
    Notify { summary: String, body: String },
}
