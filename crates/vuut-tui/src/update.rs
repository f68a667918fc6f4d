//! TUI reducer.
//!
//! The runtime calls `update(app, event)` for every event and executes the
//! returned effects. All state changes happen here or in the `AppState`
//! methods it calls.

use std::time::Instant;

use chrono::Utc;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use vuut_core::chat::ChatEvent;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::render;
use crate::state::AppState;

pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Frame { width, height } => handle_frame(app, width, height),
        UiEvent::Terminal(event) => handle_terminal_event(app, event),
        UiEvent::Chat(event) => handle_chat_event(app, event),
        UiEvent::HistoryMessage(message) => {
            app.pages
                .process_message(&message, true, app.config.prefix_len);
        }
        UiEvent::SendFailed { channel, error } => {
            app.show_error(format!("Failed to send to {channel}: {error}"));
        }
        UiEvent::PlatformStopped { error: Some(error) } => {
            tracing::error!(%error, "chat platform stopped");
            app.show_error(format!("Platform error: {error}"));
        }
        UiEvent::PlatformStopped { error: None } => {
            tracing::debug!("chat platform start task finished");
        }
        UiEvent::Shutdown => app.push_effect(UiEffect::Quit),
    }
    app.take_effects()
}

fn handle_frame(app: &mut AppState, width: u16, height: u16) {
    let (inner_width, inner_height) =
        render::output_size(width, height, &app.config, app.modal.len());
    app.pages.resize(inner_width, inner_height);
    app.tick_modal(Instant::now(), Utc::now().timestamp());
}

fn handle_chat_event(app: &mut AppState, event: ChatEvent) {
    match event {
        ChatEvent::Ready { user, channels } => app.handle_ready(user, channels),
        ChatEvent::MessageReceived(message) => {
            app.pages
                .process_message(&message, true, app.config.prefix_len);
        }
        ChatEvent::PresenceChanged { before, after } => {
            app.handle_presence(&before, &after, Utc::now().timestamp());
        }
    }
}

fn handle_terminal_event(app: &mut AppState, event: Event) {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
        Event::Paste(text) => app.input.push_str(&text),
        _ => {}
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => app.push_effect(UiEffect::Quit),
        KeyCode::Char(_) if ctrl => {}
        KeyCode::Char(ch) => app.input.push_char(ch),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Enter => app.submit(),
        KeyCode::Esc => {
            app.input.buffer.clear();
            app.set_command_mode(!app.input.command_mode);
        }
        KeyCode::Up => {
            if let Some(page) = app.pages.focused_mut() {
                page.viewport_mut().scroll_up();
            }
        }
        KeyCode::Down => {
            if let Some(page) = app.pages.focused_mut() {
                page.viewport_mut().scroll_down();
            }
        }
        _ => {}
    }
}
