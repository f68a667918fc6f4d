//! Full-screen terminal interface for vuut.
//!
//! Pages, the scroll engine, and the Elm-style runtime (state, reducer,
//! effects, render) live here; markup, commands, and the chat model come
//! from `vuut-core`.

pub mod commands;
pub mod effects;
pub mod events;
pub mod pages;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stdout};
use std::sync::Arc;

use anyhow::Result;
pub use runtime::TuiRuntime;
use vuut_core::Config;
use vuut_core::chat::ChatPlatform;

/// Runs the interactive UI until the user quits.
///
/// Without a platform, only local commands are available.
///
/// # Errors
/// Fails when stdout is not a terminal, or on terminal I/O errors.
pub fn run(config: &Config, platform: Option<Arc<dyn ChatPlatform>>) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!("vuut requires a terminal.");
    }

    let mut runtime = TuiRuntime::new(config, platform)?;
    runtime.run()
}
