//! Built-in `core` command module.

use anyhow::{Result, anyhow, bail};
use vuut_core::CommandError;
use vuut_core::chat::ChannelId;
use vuut_core::commands::{Args, Command, CommandModule, Context, Flag, Param, to_int};

use crate::effects::UiEffect;
use crate::state::AppState;

type Ctx<'a> = Context<'a, AppState>;

/// Commands available in every session.
pub struct CoreModule;

impl CommandModule<AppState> for CoreModule {
    fn name(&self) -> &str {
        "core"
    }

    fn commands(&self) -> Result<Vec<Command<AppState>>, CommandError> {
        let channel = Command::new("channel", |ctx: &mut Ctx<'_>, _: &Args| list_channels(ctx))
            .alias("ch")
            .help("List channels or switch to one")
            .subcommand(
                Command::new("list", |ctx: &mut Ctx<'_>, _: &Args| list_channels(ctx))
                    .alias("ls")
                    .help("List channel pages"),
            )?
            .subcommand(
                Command::new("open", open_channel)
                    .alias("o")
                    .help("Focus a channel page and load its history")
                    .param(Param::required("id").converter(to_int)),
            )?;

        Ok(vec![
            Command::new("ping", ping).help("Check that commands are working"),
            Command::new("echo", echo)
                .help("Print a message")
                .param(Param::required("message"))
                .flag(
                    Flag::new("upper")
                        .default_value(false)
                        .description("Upper-case the message"),
                )
                .flag(
                    Flag::new("lower")
                        .default_value(false)
                        .description("Lower-case the message"),
                ),
            Command::new("help", help)
                .usage("help [command]")
                .help("List commands, or describe one")
                .param(Param::optional("command", "")),
            Command::new("quit", |ctx: &mut Ctx<'_>, _: &Args| {
                ctx.state.push_effect(UiEffect::Quit);
                Ok(())
            })
            .alias("q")
            .alias("exit")
            .help("Exit vuut"),
            channel,
            Command::new("clear", |ctx: &mut Ctx<'_>, _: &Args| {
                if let Some(page) = ctx.state.pages.focused_mut() {
                    page.viewport_mut().clear();
                }
                Ok(())
            })
            .help("Clear the focused page"),
        ])
    }
}

fn ping(ctx: &mut Ctx<'_>, _: &Args) -> Result<()> {
    tracing::info!("Pong!");
    ctx.reply("Pong!");
    Ok(())
}

fn echo(ctx: &mut Ctx<'_>, args: &Args) -> Result<()> {
    let message = args.get_str("message").unwrap_or_default();
    let upper = ctx.flag_bool("upper");
    let lower = ctx.flag_bool("lower");

    let text = match (upper, lower) {
        (true, true) => bail!("--upper and --lower cannot be combined"),
        (true, false) => message.to_uppercase(),
        (false, true) => message.to_lowercase(),
        (false, false) => message.to_string(),
    };
    ctx.reply(text);
    Ok(())
}

fn help(ctx: &mut Ctx<'_>, args: &Args) -> Result<()> {
    let target = args.get_str("command").unwrap_or_default();
    let lines: Vec<String> = if target.is_empty() {
        ctx.state
            .parser
            .commands()
            .into_iter()
            .map(summary)
            .collect()
    } else {
        let command = ctx
            .state
            .parser
            .get(target)
            .ok_or_else(|| CommandError::NotFound(target.to_string()))?;
        describe(command)
    };

    for line in lines {
        ctx.reply(line);
    }
    Ok(())
}

fn summary(command: &Command<AppState>) -> String {
    let mut line = command.name().to_string();
    if !command.aliases().is_empty() {
        line = format!("{line} ({})", command.aliases().join(", "));
    }
    match command.help_text() {
        Some(help) => format!("{line} - {help}"),
        None => line,
    }
}

fn describe(command: &Command<AppState>) -> Vec<String> {
    let mut lines = vec![format!("usage: {}", command.usage_line())];
    if let Some(help) = command.help_text() {
        lines.push(help.to_string());
    }
    if !command.aliases().is_empty() {
        lines.push(format!("aliases: {}", command.aliases().join(", ")));
    }
    for flag in command.flags() {
        let mut line = format!("  --{}", flag.name());
        if let Some(help) = flag.help() {
            line = format!("{line}  {help}");
        }
        lines.push(line);
    }
    for sub in command.subcommands() {
        lines.push(format!("  {}", summary(sub)));
    }
    lines
}

fn list_channels(ctx: &mut Ctx<'_>) -> Result<()> {
    let focus = ctx.state.pages.focus();
    let lines: Vec<String> = ctx
        .state
        .pages
        .pages()
        .filter_map(|(id, page)| {
            let channel = page.as_channel()?.channel();
            let marker = if focus == Some(id) { ">" } else { " " };
            Some(format!("{marker} {} #{}", channel.id, channel.name))
        })
        .collect();

    if lines.is_empty() {
        ctx.reply("No channels available.");
    }
    for line in lines {
        ctx.reply(line);
    }
    Ok(())
}

fn open_channel(ctx: &mut Ctx<'_>, args: &Args) -> Result<()> {
    let raw = args
        .get_int("id")
        .ok_or_else(|| anyhow!("channel id must be a number"))?;
    let id = u64::try_from(raw).map_err(|err| anyhow!("invalid channel id {raw}: {err}"))?;
    if !ctx.state.open_channel(ChannelId(id)) {
        bail!("no channel with id {id}");
    }
    tracing::debug!(channel = id, "channel opened from command");
    Ok(())
}
