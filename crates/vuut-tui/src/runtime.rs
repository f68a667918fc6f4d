//! TUI runtime: owns the terminal, runs the event loop, executes effects.
//!
//! The reducer stays pure and returns effects; every side effect happens
//! here. Async work (platform events, sends, history replay) reports back
//! through the inbox, which is drained once per frame.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event;
use tokio::process::Command;
use tokio::signal;
use tokio::sync::mpsc;
use vuut_core::Config;
use vuut_core::chat::{ChannelId, ChatEvent, ChatPlatform};

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::terminal::Tui;
use crate::{render, terminal, update};

/// How long the loop waits for terminal input each frame.
pub const POLL_DURATION: Duration = Duration::from_millis(10);

type UiEventSender = mpsc::UnboundedSender<UiEvent>;
type UiEventReceiver = mpsc::UnboundedReceiver<UiEvent>;

/// Full-screen TUI runtime.
///
/// Terminal state is restored on drop, on panic, and when a shutdown
/// signal stops the loop.
pub struct TuiRuntime {
    terminal: Tui,
    pub state: AppState,
    platform: Option<Arc<dyn ChatPlatform>>,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
}

impl TuiRuntime {
    /// Builds the application state and takes over the terminal.
    ///
    /// Without a platform the UI starts on a scratch page.
    ///
    /// # Errors
    /// Fails if the built-in commands cannot be registered or the terminal
    /// cannot be set up.
    pub fn new(config: &Config, platform: Option<Arc<dyn ChatPlatform>>) -> Result<Self> {
        let mut state = AppState::new(config).context("Failed to register built-in commands")?;
        if platform.is_none() {
            state.show_scratch();
        }

        // Panic hook goes in before the alternate screen.
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        Ok(Self {
            terminal,
            state,
            platform,
            inbox_tx,
            inbox_rx,
        })
    }

    /// Runs the main event loop until a quit effect or shutdown signal.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Returns an error if terminal I/O fails.
    pub fn run(&mut self) -> Result<()> {
        terminal::enable_input_features()?;
        self.start_platform();
        self.watch_signals();

        let result = self.event_loop();

        let _ = terminal::disable_input_features();
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            // Layout and modal timers update before anything else.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            self.terminal.draw(|frame| {
                render::render(&self.state, frame);
            })?;
        }

        Ok(())
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();
        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let poll_duration = if events.is_empty() {
            POLL_DURATION
        } else {
            Duration::ZERO
        };
        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        Ok(events)
    }

    /// Runs the platform's dispatch loop and forwards its events.
    fn start_platform(&self) {
        let Some(platform) = self.platform.as_ref().map(Arc::clone) else {
            return;
        };

        let (chat_tx, mut chat_rx) = mpsc::unbounded_channel::<ChatEvent>();
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            while let Some(event) = chat_rx.recv().await {
                if tx.send(UiEvent::Chat(event)).is_err() {
                    break;
                }
            }
        });

        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            let error = platform.start(chat_tx).await.err().map(|err| format!("{err:#}"));
            let _ = tx.send(UiEvent::PlatformStopped { error });
        });
    }

    /// SIGINT and SIGTERM stop the loop like `:quit`.
    fn watch_signals(&self) {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            tracing::info!("shutdown signal received");
            let _ = tx.send(UiEvent::Shutdown);
        });
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::SendMessage { channel, content } => self.send_message(channel, content),
            UiEffect::ReplayHistory { channel, limit } => self.replay_history(channel, limit),
            UiEffect::Notify { summary, body } => notify(summary, body),
        }
    }

    fn send_message(&self, channel: ChannelId, content: String) {
        let Some(platform) = self.platform.as_ref().map(Arc::clone) else {
            tracing::warn!(%channel, "no platform; message dropped");
            return;
        };
        self.spawn_effect(move || async move {
            match platform.send(channel, &content).await {
                Ok(()) => None,
                Err(err) => Some(UiEvent::SendFailed {
                    channel,
                    error: format!("{err:#}"),
                }),
            }
        });
    }

    fn replay_history(&self, channel: ChannelId, limit: usize) {
        let Some(platform) = self.platform.as_ref().map(Arc::clone) else {
            return;
        };
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            if let Err(err) = replay(platform.as_ref(), channel, limit, &tx).await {
                tracing::error!(%channel, "history replay failed: {err:#}");
            }
        });
    }

    /// Spawns an async effect and posts its result event, if any.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Option<UiEvent>> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        tokio::spawn(async move {
            if let Some(ev) = f().await {
                let _ = tx.send(ev);
            }
        });
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}

/// Fetches recent history and posts it oldest first.
///
/// Live messages are not held back while this runs, so one may land
/// between history lines.
pub(crate) async fn replay(
    platform: &dyn ChatPlatform,
    channel: ChannelId,
    limit: usize,
    tx: &UiEventSender,
) -> Result<usize> {
    tracing::debug!(%channel, limit, "replaying history");
    let mut messages = platform
        .history(channel, limit)
        .await
        .with_context(|| format!("fetch history of {channel}"))?;
    messages.reverse();

    let count = messages.len();
    for message in messages {
        tx.send(UiEvent::HistoryMessage(message))
            .context("UI inbox closed")?;
    }
    tracing::info!(%channel, count, "history replayed");
    Ok(count)
}

fn notify(summary: String, body: String) {
    if !cfg!(unix) {
        return;
    }
    tokio::spawn(async move {
        let status = Command::new("notify-send")
            .args(["-u", "critical", &summary, &body])
            .status()
            .await;
        match status {
            Ok(status) if !status.success() => {
                tracing::warn!(%status, "notify-send exited with failure");
            }
            Ok(_) => {}
            Err(err) => tracing::warn!("failed to run notify-send: {err}"),
        }
    });
}

#[cfg(unix)]
async fn shutdown_signal() {
    use signal::unix::{SignalKind, signal as unix_signal};

    let mut term = match unix_signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(err) => {
            tracing::warn!("cannot listen for SIGTERM: {err}");
            let _ = signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
}

#[cfg(test)]
mod tests {
    use vuut_core::chat::LocalPlatform;

    use super::*;

    #[tokio::test]
    async fn test_replay_posts_history_oldest_first() {
        let platform = LocalPlatform::new("me");
        let (tx, mut rx) = mpsc::unbounded_channel();

        let count = replay(&platform, ChannelId(1001), 100, &tx).await.unwrap();
        assert!(count > 1);

        let mut stamps = Vec::new();
        while let Ok(UiEvent::HistoryMessage(message)) = rx.try_recv() {
            assert_eq!(message.channel, ChannelId(1001));
            stamps.push(message.created_at);
        }
        assert_eq!(stamps.len(), count);
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_replay_respects_limit() {
        let platform = LocalPlatform::new("me");
        let (tx, mut rx) = mpsc::unbounded_channel();

        let count = replay(&platform, ChannelId(1001), 1, &tx).await.unwrap();
        assert_eq!(count, 1);
        assert!(matches!(rx.try_recv(), Ok(UiEvent::HistoryMessage(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_replay_fails_when_inbox_closed() {
        let platform = LocalPlatform::new("me");
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        let err = replay(&platform, ChannelId(1001), 10, &tx).await.unwrap_err();
        assert!(format!("{err:#}").contains("UI inbox closed"));
    }
}
