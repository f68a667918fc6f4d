//! Application state.
//!
//! ```text
//! AppState
//! ├── config: UiConfig      (per-frame layout settings)
//! ├── pages: PageManager    (pages, focus, channel routing)
//! ├── modal: Modal          (three status lines above the output)
//! ├── input: InputState     (buffer, command mode)
//! └── parser: Parser<AppState>
//! ```
//!
//! Commands run against `AppState` directly; anything that needs I/O is
//! queued as a [`UiEffect`] and drained by the reducer.

use std::fmt::Display;
use std::mem;
use std::time::{Duration, Instant};

use vuut_core::chat::{Channel, ChannelId, Presence, Status, User};
use vuut_core::commands::{CommandHost, Parser};
use vuut_core::markup::{Markup, with_prefix};
use vuut_core::modal::{Modal, ModalSlot};
use vuut_core::text::clock_time;
use vuut_core::{CommandError, Config};

use crate::commands::CoreModule;
use crate::effects::UiEffect;
use crate::pages::{ChannelPage, PageId, PageManager, ScrollPage};

/// Modal line holding the title, clock, and mode indicator.
pub const HEADER_LINE: usize = 0;
/// Modal line for command replies when no page is focused.
pub const REPLY_LINE: usize = 1;
/// Modal line for command errors.
pub const ERROR_LINE: usize = 2;

const MODAL_LINES: usize = 3;
const TITLE: &str = "<g>Vuut<g> <r>Alpha<r>";
const COMMAND_MODE_LABEL: &str = "COMMAND MODE";
const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);
/// Glyph shown in the author column of presence lines.
const PRESENCE_MARKER: &str = "\u{2192}";

const SCRATCH_BANNER: &str = "vuut is running offline.\n\
Press Esc for command mode, then type :help for the command list.";

/// Layout and behaviour settings read every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiConfig {
    pub prefix_len: usize,
    pub history_limit: usize,
    pub modal_border: bool,
    pub output_border: bool,
    pub input_border: bool,
    pub disable_message_send: bool,
    pub notifications: bool,
}

impl From<&Config> for UiConfig {
    fn from(config: &Config) -> Self {
        Self {
            prefix_len: config.prefix_len,
            history_limit: config.history_limit,
            modal_border: config.modal_border,
            output_border: config.output_border,
            input_border: config.input_border,
            disable_message_send: config.disable_message_send,
            notifications: config.notifications,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Trailing-edit input buffer.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    pub buffer: String,
    pub command_mode: bool,
}

impl InputState {
    pub fn push_char(&mut self, ch: char) {
        if !ch.is_control() {
            self.buffer.push(ch);
        }
    }

    /// Appends the printable characters of `text`.
    pub fn push_str(&mut self, text: &str) {
        self.buffer.extend(text.chars().filter(|c| !c.is_control()));
    }

    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    pub fn take(&mut self) -> String {
        mem::take(&mut self.buffer)
    }
}

pub struct AppState {
    pub config: UiConfig,
    pub pages: PageManager,
    pub modal: Modal,
    pub input: InputState,
    pub parser: Parser<AppState>,
    pub local_user: Option<User>,
    /// Channel focused on `Ready`; the first channel when unset.
    pub target_channel: Option<ChannelId>,
    pub should_quit: bool,
    pending_effects: Vec<UiEffect>,
}

impl AppState {
    /// Creates the state and registers the built-in commands.
    ///
    /// # Errors
    /// Fails when a built-in command cannot be registered.
    pub fn new(config: &Config) -> Result<Self, CommandError> {
        let mut parser = Parser::new();
        parser.load_module(&CoreModule)?;

        let mut modal = Modal::new(MODAL_LINES);
        modal.set(HEADER_LINE, ModalSlot::Center, TITLE, None);

        Ok(Self {
            config: UiConfig::from(config),
            pages: PageManager::new(),
            modal,
            input: InputState::default(),
            parser,
            local_user: None,
            target_channel: config.target_channel,
            should_quit: false,
            pending_effects: Vec::new(),
        })
    }

    /// Queues an effect for the reducer to hand to the runtime.
    pub fn push_effect(&mut self, effect: UiEffect) {
        self.pending_effects.push(effect);
    }

    pub fn take_effects(&mut self) -> Vec<UiEffect> {
        mem::take(&mut self.pending_effects)
    }

    /// Shows `err` in the modal error line for a few seconds.
    pub fn show_error(&mut self, err: impl Display) {
        tracing::warn!(%err, "command failed");
        self.modal.set(
            ERROR_LINE,
            ModalSlot::Center,
            format!("<r>{err}<r>"),
            Some(MESSAGE_TIMEOUT),
        );
    }

    pub fn set_command_mode(&mut self, enabled: bool) {
        self.input.command_mode = enabled;
        let label = if enabled { COMMAND_MODE_LABEL } else { "" };
        self.modal.set(HEADER_LINE, ModalSlot::Left, label, None);
    }

    /// Refreshes the clock and expires timed modal slots.
    pub fn tick_modal(&mut self, now: Instant, timestamp: i64) {
        self.modal
            .set(HEADER_LINE, ModalSlot::Right, clock_time(timestamp), None);
        self.modal.on_screen_update(now);
    }

    /// Handles Enter on the input line.
    ///
    /// In command mode only `:`-prefixed lines run; anything else is
    /// discarded. Outside command mode the trimmed text goes to the focused
    /// channel. The buffer is always cleared.
    pub fn submit(&mut self) {
        let text = self.input.take();

        if self.input.command_mode {
            if let Some(line) = text.strip_prefix(':') {
                self.run_command(line);
            }
            return;
        }

        let content = text.trim();
        if content.is_empty() || self.config.disable_message_send {
            return;
        }
        if let Some(page) = self.pages.focused_channel() {
            let channel = page.channel().id;
            self.push_effect(UiEffect::SendMessage {
                channel,
                content: content.to_string(),
            });
        }
    }

    /// Tokenizes `line` with shell quoting and dispatches it.
    pub fn run_command(&mut self, line: &str) {
        let Some(tokens) = shlex::split(line) else {
            self.show_error("Unbalanced quotes in command");
            return;
        };
        let Some((name, rest)) = tokens.split_first() else {
            return;
        };

        tracing::debug!(command = %name, args = rest.len(), "dispatching command");
        let result = match self.parser.parse(name, rest) {
            Ok(invocation) => invocation.from_page(self.pages.focus()).run(self),
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            self.show_error(err);
        }
    }

    /// Builds one page per channel and focuses the target (or the first).
    pub fn handle_ready(&mut self, user: User, channels: Vec<Channel>) {
        tracing::info!(user = %user.name, channels = channels.len(), "platform ready");
        let first = channels.first().map(|c| c.id);
        for channel in channels {
            if self.pages.channel_page(channel.id).is_none() {
                self.pages.add_page(ChannelPage::new(channel, user.id), None);
            }
        }
        self.local_user = Some(user);

        let target = self.target_channel.filter(|id| {
            let known = self.pages.channel_page(*id).is_some();
            if !known {
                tracing::warn!(channel = %id, "target channel not found");
            }
            known
        });
        if let Some(channel) = target.or(first) {
            self.open_channel(channel);
        }
    }

    /// Focuses the page of `channel` and opens it.
    ///
    /// Returns false when no page exists for the channel.
    pub fn open_channel(&mut self, channel: ChannelId) -> bool {
        let Some(id) = self.pages.channel_page(channel) else {
            return false;
        };
        self.pages.set_focus(id);

        let limit = self.config.history_limit;
        let request = self
            .pages
            .channel_page_mut(channel)
            .and_then(|page| page.open(limit));
        if let Some(request) = request {
            self.push_effect(UiEffect::ReplayHistory {
                channel: request.channel,
                limit: request.limit,
            });
        }
        true
    }

    /// Focuses a plain page with a short banner, for offline use.
    pub fn show_scratch(&mut self) -> PageId {
        let id = self
            .pages
            .add_page(ScrollPage::new("scratch", SCRATCH_BANNER), None);
        self.pages.set_focus(id);
        id
    }

    /// Writes a presence change into the focused channel page.
    pub fn handle_presence(&mut self, before: &Presence, after: &Presence, timestamp: i64) {
        let Some(page) = self.pages.focused_channel() else {
            return;
        };
        if before.guild != page.channel().guild {
            return;
        }
        if !is_reportable(before.status, after.status) {
            return;
        }

        let summary = format!("{}: {} -> {}", after.user.name, before.status, after.status);
        let line = match with_prefix(
            &Markup::new(summary.as_str()),
            &Markup::new(clock_time(timestamp)),
            &Markup::new(PRESENCE_MARKER),
            self.config.prefix_len,
            true,
            &[],
        ) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(%err, "presence line does not fit");
                Markup::new(summary.as_str())
            }
        };
        let line = match after.status {
            Status::Online => line.wrapped_in(&["<g>"]),
            Status::Idle => line.wrapped_in(&["<y>"]),
            Status::Offline => line,
        };

        if let Some(page) = self.pages.focused_mut() {
            page.add_line(line.into_string());
        }
        if self.config.notifications {
            self.push_effect(UiEffect::Notify {
                summary: "Status Update".to_string(),
                body: summary,
            });
        }
    }
}

impl CommandHost for AppState {
    fn reply(&mut self, origin: Option<PageId>, text: String) {
        match origin.and_then(|id| self.pages.get_mut(id)) {
            Some(page) => {
                for line in text.split('\n') {
                    page.add_line(line);
                }
            }
            None => self
                .modal
                .set(REPLY_LINE, ModalSlot::Center, text, Some(MESSAGE_TIMEOUT)),
        }
    }
}

/// Offline -> anything, and anything -> offline, are reported. Moves among
/// online and idle are not.
fn is_reportable(before: Status, after: Status) -> bool {
    if before == Status::Offline {
        return true;
    }
    !(after == Status::Idle || (before == Status::Idle && after == Status::Online))
}
