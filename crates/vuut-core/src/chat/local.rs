use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::mpsc;

use super::{Channel, ChannelId, ChatEvent, ChatPlatform, GuildId, Message, User, UserId};

const DEMO_GUILD: GuildId = GuildId(1);
/// 2024-01-01 09:00:00 UTC, start of the seeded conversation.
const SEED_EPOCH: i64 = 1_704_099_600;

#[derive(Default)]
struct LocalState {
    messages: HashMap<ChannelId, Vec<Message>>,
    events: Option<mpsc::UnboundedSender<ChatEvent>>,
}

/// In-memory loopback platform.
///
/// Serves one demo guild with a few channels and some seeded history.
/// Sent messages are stored and echoed back as `MessageReceived`.
pub struct LocalPlatform {
    user: User,
    channels: Vec<Channel>,
    state: Mutex<LocalState>,
}

impl LocalPlatform {
    pub fn new(user_name: impl Into<String>) -> Self {
        let channels: Vec<Channel> = [(1001, "general"), (1002, "random"), (1003, "dev")]
            .into_iter()
            .map(|(id, name)| Channel {
                id: ChannelId(id),
                guild: DEMO_GUILD,
                name: name.to_string(),
            })
            .collect();

        let mut messages: HashMap<ChannelId, Vec<Message>> = channels
            .iter()
            .map(|c| (c.id, Vec::new()))
            .collect();
        messages.insert(ChannelId(1001), seed_history(ChannelId(1001)));

        Self {
            user: User {
                id: UserId(1),
                name: user_name.into(),
            },
            channels,
            state: Mutex::new(LocalState {
                messages,
                events: None,
            }),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Pushes an event as if the platform produced it.
    ///
    /// Received messages are also stored in the channel history.
    pub fn inject(&self, event: ChatEvent) -> Result<()> {
        let mut state = self.lock()?;
        if let ChatEvent::MessageReceived(message) = &event {
            state
                .messages
                .entry(message.channel)
                .or_default()
                .push(message.clone());
        }
        if let Some(events) = &state.events {
            events
                .send(event)
                .map_err(|e| anyhow!("event receiver closed: {e}"))?;
        }
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, LocalState>> {
        self.state
            .lock()
            .map_err(|e| anyhow!("local platform state poisoned: {e}"))
    }
}

#[async_trait]
impl ChatPlatform for LocalPlatform {
    async fn start(&self, events: mpsc::UnboundedSender<ChatEvent>) -> Result<()> {
        events
            .send(ChatEvent::Ready {
                user: self.user.clone(),
                channels: self.channels.clone(),
            })
            .map_err(|e| anyhow!("event receiver closed: {e}"))?;
        self.lock()?.events = Some(events);
        tracing::info!(channels = self.channels.len(), "local platform ready");
        Ok(())
    }

    async fn history(&self, channel: ChannelId, limit: usize) -> Result<Vec<Message>> {
        let state = self.lock()?;
        let messages = state
            .messages
            .get(&channel)
            .ok_or_else(|| anyhow!("unknown channel {channel}"))?;
        Ok(messages.iter().rev().take(limit).cloned().collect())
    }

    async fn send(&self, channel: ChannelId, content: &str) -> Result<()> {
        if !self.channels.iter().any(|c| c.id == channel) {
            anyhow::bail!("unknown channel {channel}");
        }
        let message = Message {
            channel,
            author: self.user.clone(),
            content: content.to_string(),
            created_at: Utc::now().timestamp(),
        };
        self.inject(ChatEvent::MessageReceived(message))
    }
}

fn seed_history(channel: ChannelId) -> Vec<Message> {
    let ada = User {
        id: UserId(2),
        name: "ada".to_string(),
    };
    let grace = User {
        id: UserId(3),
        name: "grace".to_string(),
    };
    let lines = [
        (&ada, "morning all"),
        (&grace, "morning! build is green again"),
        (&ada, "nice, the flaky resize test?"),
        (&grace, "yes, the scroll head was off by one after shrinking the window"),
        (&ada, "classic"),
    ];

    lines
        .into_iter()
        .zip(0_i64..)
        .map(|((author, content), n)| Message {
            channel,
            author: author.clone(),
            content: content.to_string(),
            created_at: SEED_EPOCH + n * 47,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{Presence, Status};

    #[tokio::test]
    async fn test_start_emits_ready() {
        let platform = LocalPlatform::new("me");
        let (tx, mut rx) = mpsc::unbounded_channel();
        platform.start(tx).await.unwrap();

        match rx.recv().await.unwrap() {
            ChatEvent::Ready { user, channels } => {
                assert_eq!(user.name, "me");
                assert_eq!(channels.len(), 3);
            }
            other => panic!("expected Ready, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_history_is_newest_first_and_limited() {
        let platform = LocalPlatform::new("me");
        let history = platform.history(ChannelId(1001), 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "classic");
        assert!(history[0].created_at > history[1].created_at);

        assert!(platform.history(ChannelId(1002), 100).await.unwrap().is_empty());
        assert!(platform.history(ChannelId(9), 1).await.is_err());
    }

    #[tokio::test]
    async fn test_send_echoes_and_stores() {
        let platform = LocalPlatform::new("me");
        let (tx, mut rx) = mpsc::unbounded_channel();
        platform.start(tx).await.unwrap();
        let _ready = rx.recv().await.unwrap();

        platform.send(ChannelId(1002), "hello").await.unwrap();
        let ChatEvent::MessageReceived(message) = rx.recv().await.unwrap() else {
            panic!("expected a message");
        };
        assert_eq!(message.author.name, "me");
        assert_eq!(message.content, "hello");

        let history = platform.history(ChannelId(1002), 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(platform.send(ChannelId(42), "x").await.is_err());
    }

    #[tokio::test]
    async fn test_inject_before_start_only_stores() {
        let platform = LocalPlatform::new("me");
        let user = platform.user().clone();
        platform
            .inject(ChatEvent::MessageReceived(Message {
                channel: ChannelId(1003),
                author: user.clone(),
                content: "queued".to_string(),
                created_at: SEED_EPOCH,
            }))
            .unwrap();
        platform
            .inject(ChatEvent::PresenceChanged {
                before: Presence {
                    user: user.clone(),
                    guild: DEMO_GUILD,
                    status: Status::Offline,
                },
                after: Presence {
                    user,
                    guild: DEMO_GUILD,
                    status: Status::Online,
                },
            })
            .unwrap();

        let history = platform.history(ChannelId(1003), 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "queued");
        assert_eq!(history[0].author.name, "me");

        let (tx, mut rx) = mpsc::unbounded_channel();
        platform.start(tx).await.unwrap();
        assert!(matches!(rx.recv().await, Some(ChatEvent::Ready { .. })));
        assert!(rx.try_recv().is_err());
    }
}
