//! Chat platform data model and the collaborator trait the UI talks to.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

mod local;

pub use local::LocalPlatform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: ChannelId,
    pub guild: GuildId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub channel: ChannelId,
    pub author: User,
    pub content: String,
    /// Seconds since the Unix epoch.
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Online,
    Idle,
    Offline,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::Online => "online",
            Status::Idle => "idle",
            Status::Offline => "offline",
        })
    }
}

/// A member's status within one guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub user: User,
    pub guild: GuildId,
    pub status: Status,
}

/// Notifications pushed by a running platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// Connected; `channels` are the text channels visible to `user`.
    Ready { user: User, channels: Vec<Channel> },
    MessageReceived(Message),
    PresenceChanged { before: Presence, after: Presence },
}

/// The chat service vuut renders.
#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Connects and dispatches events into `events` until the platform stops.
    async fn start(&self, events: mpsc::UnboundedSender<ChatEvent>) -> Result<()>;

    /// Up to `limit` most recent messages of `channel`, newest first.
    async fn history(&self, channel: ChannelId, limit: usize) -> Result<Vec<Message>>;

    async fn send(&self, channel: ChannelId, content: &str) -> Result<()>;
}
