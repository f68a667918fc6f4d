//! CLI entry and dispatch.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Runtime;
use vuut_core::Config;
use vuut_core::chat::{ChannelId, ChatPlatform, LocalPlatform};

use crate::logging;

mod commands;

#[derive(Parser)]
#[command(name = "vuut")]
#[command(version)]
#[command(about = "Terminal chat client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Start without connecting to the chat platform
    #[arg(long)]
    offline: bool,

    /// Channel to focus once connected
    #[arg(long, value_name = "ID")]
    channel: Option<u64>,

    /// Never send typed text; only run commands
    #[arg(long = "no-send")]
    no_send: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Create a default config file
    Init,
}

impl Cli {
    /// Flags win over the config file.
    fn apply_overrides(&self, config: &mut Config) {
        if self.offline {
            config.start_bot = false;
        }
        if let Some(id) = self.channel {
            config.target_channel = Some(ChannelId(id));
        }
        if self.no_send {
            config.disable_message_send = true;
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let rt = Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(&cli) })
}

fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
        None => {
            let mut config = Config::load().context("load config")?;
            cli.apply_overrides(&mut config);
            chat(&config)
        }
    }
}

/// Runs the UI. Expects to be called inside the tokio runtime.
fn chat(config: &Config) -> Result<()> {
    let _log_guard = logging::init(&config.effective_log_file());
    tracing::info!(start_bot = config.start_bot, "starting vuut");

    let platform: Option<Arc<dyn ChatPlatform>> = config
        .start_bot
        .then(|| Arc::new(LocalPlatform::new(config.user_name.clone())) as Arc<dyn ChatPlatform>);

    let result = vuut_tui::run(config, platform);
    if let Err(err) = &result {
        tracing::error!("vuut stopped: {err:#}");
    }
    result
}
