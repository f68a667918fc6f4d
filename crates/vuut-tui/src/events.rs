//! UI event types.
//!
//! Everything the reducer reacts to arrives as a `UiEvent`: terminal input,
//! platform notifications, and results posted back by spawned tasks.

use crossterm::event::Event;
use vuut_core::chat::{ChannelId, ChatEvent, Message};

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Current terminal size, prepended to every loop iteration.
    Frame { width: u16, height: u16 },

    /// Raw crossterm input.
    Terminal(Event),

    /// Pushed by the chat platform.
    Chat(ChatEvent),

    /// One message of a history replay, in chronological order.
    HistoryMessage(Message),

    /// A send task failed.
    SendFailed { channel: ChannelId, error: String },

    /// The platform's start task returned.
    PlatformStopped { error: Option<String> },

    /// SIGINT or SIGTERM.
    Shutdown,
}
