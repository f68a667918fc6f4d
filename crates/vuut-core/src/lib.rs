//! Core library for vuut: markup, commands, the modal, and the chat model.
//!
//! Nothing here touches the terminal; `vuut-tui` builds the interface on
//! top of these pieces.

pub mod chat;
pub mod commands;
pub mod config;
pub mod error;
pub mod markup;
pub mod modal;
pub mod text;

pub use config::Config;
pub use error::{CommandError, LayoutError};
