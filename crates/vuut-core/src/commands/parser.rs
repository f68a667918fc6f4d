use std::collections::HashMap;
use std::sync::Arc;

use super::command::Command;
use super::context::Context;
use super::value::Value;
use crate::error::CommandError;

/// A group of commands registered and removed together.
pub trait CommandModule<S> {
    fn name(&self) -> &str;

    /// Builds the module's commands. Fails when a command tree is malformed.
    fn commands(&self) -> Result<Vec<Command<S>>, CommandError>;
}

/// Result of [`Parser::parse`]: the resolved command plus split tokens.
pub struct Invocation<S> {
    pub command: Arc<Command<S>>,
    pub positionals: Vec<String>,
    pub flags: HashMap<String, Value>,
    /// Page the command was entered on, if the host tracks one.
    pub origin: Option<usize>,
}

impl<S> Invocation<S> {
    /// Records the page the command was entered on.
    #[must_use]
    pub fn from_page(mut self, page: Option<usize>) -> Self {
        self.origin = page;
        self
    }

    /// Runs the resolved command against `state` with a fresh context.
    pub fn run(self, state: &mut S) -> Result<(), CommandError> {
        let command = Arc::clone(&self.command);
        let mut ctx = Context::new(self.command, state, self.origin);
        command.invoke(&mut ctx, self.positionals, self.flags)
    }
}

/// Top-level command registry.
pub struct Parser<S> {
    commands: HashMap<String, Arc<Command<S>>>,
    aliases: HashMap<String, String>,
}

impl<S> Default for Parser<S> {
    fn default() -> Self {
        Self {
            commands: HashMap::new(),
            aliases: HashMap::new(),
        }
    }
}

impl<S> Parser<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a top-level command.
    ///
    /// # Errors
    /// `Invalid` for an empty or whitespace-containing name or alias,
    /// `NameConflict` when the name or an alias is already taken.
    pub fn register(&mut self, command: Command<S>) -> Result<(), CommandError> {
        command.validate()?;
        if let Some(taken) = command.names().find(|key| self.aliases.contains_key(*key)) {
            return Err(CommandError::NameConflict(taken.to_string()));
        }

        let name = command.name().to_string();
        for key in command.names() {
            self.aliases.insert(key.to_string(), name.clone());
        }
        tracing::debug!(command = %name, "registered command");
        self.commands.insert(name, Arc::new(command));
        Ok(())
    }

    /// Removes a command and every alias entry pointing at it.
    /// Unknown names are ignored.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<Command<S>>> {
        let canonical = self.aliases.get(name)?.clone();
        let removed = self.commands.remove(&canonical)?;
        self.aliases.retain(|_, target| *target != canonical);
        Some(removed)
    }

    /// Registers every command of `module`, tagging them with its name.
    /// On failure nothing from the module stays registered.
    pub fn load_module(&mut self, module: &dyn CommandModule<S>) -> Result<(), CommandError> {
        let mut loaded: Vec<String> = Vec::new();
        for mut command in module.commands()? {
            command.set_module(module.name());
            let name = command.name().to_string();
            if let Err(err) = self.register(command) {
                for name in &loaded {
                    self.unregister(name);
                }
                return Err(err);
            }
            loaded.push(name);
        }
        tracing::debug!(module = module.name(), commands = loaded.len(), "loaded module");
        Ok(())
    }

    /// Unregisters every command tagged with the module's name.
    pub fn remove_module(&mut self, module: &dyn CommandModule<S>) {
        let names: Vec<String> = self
            .commands
            .values()
            .filter(|c| c.module() == Some(module.name()))
            .map(|c| c.name().to_string())
            .collect();
        for name in names {
            self.unregister(&name);
        }
    }

    /// Resolves a name or alias to its command.
    pub fn get(&self, name: &str) -> Option<&Arc<Command<S>>> {
        self.aliases
            .get(name)
            .and_then(|canonical| self.commands.get(canonical))
    }

    /// Registered commands ordered by name.
    pub fn commands(&self) -> Vec<&Command<S>> {
        let mut commands: Vec<_> = self.commands.values().map(AsRef::as_ref).collect();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands
    }

    /// Resolves `name`, descends into subcommands, and splits the rest.
    ///
    /// Subcommand descent is greedy: while the next token names a
    /// subcommand of the current command, it is consumed.
    pub fn parse(&self, name: &str, tokens: &[String]) -> Result<Invocation<S>, CommandError> {
        let Some(mut command) = self.get(name).map(Arc::clone) else {
            return Err(CommandError::NotFound(name.to_string()));
        };

        let mut rest = tokens;
        while let Some((next, tail)) = rest.split_first() {
            let Some(sub) = command.get_subcommand(next).map(Arc::clone) else {
                break;
            };
            command = sub;
            rest = tail;
        }

        let (flags, positionals) = parse_flags(rest)?;
        tracing::debug!(
            command = command.name(),
            positionals = positionals.len(),
            flags = flags.len(),
            "parsed command"
        );
        Ok(Invocation {
            command,
            positionals,
            flags,
            origin: None,
        })
    }
}

/// Splits tokens into flags and positionals.
///
/// `--name` is a boolean flag set to `true`. `-name value` stores the next
/// token, which must exist and must not itself start with `-`. Anything
/// else (including a lone `-`) is positional, in order.
pub fn parse_flags(tokens: &[String]) -> Result<(HashMap<String, Value>, Vec<String>), CommandError> {
    let mut flags = HashMap::new();
    let mut positionals = Vec::new();
    let mut iter = tokens.iter();

    while let Some(token) = iter.next() {
        if token.len() > 2
            && let Some(name) = token.strip_prefix("--")
        {
            flags.insert(name.to_string(), Value::Bool(true));
        } else if token.len() > 1
            && let Some(name) = token.strip_prefix('-')
        {
            let Some(value) = iter.next() else {
                return Err(CommandError::flag(
                    "Unexpected end of input after flag declaration.",
                ));
            };
            if value.starts_with('-') {
                return Err(CommandError::flag(format!(
                    "No value was provided for flag {token}"
                )));
            }
            flags.insert(name.to_string(), Value::Str(value.clone()));
        } else {
            positionals.push(token.clone());
        }
    }

    Ok((flags, positionals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::CommandHost;
    use crate::commands::value::to_int;
    use crate::commands::{Flag, Param};

    #[derive(Default)]
    struct Recorder {
        replies: Vec<String>,
        origins: Vec<Option<usize>>,
    }

    impl CommandHost for Recorder {
        fn reply(&mut self, origin: Option<usize>, text: String) {
            self.origins.push(origin);
            self.replies.push(text);
        }
    }

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    fn echo() -> Command<Recorder> {
        Command::new("echo", |ctx: &mut Context<'_, Recorder>, args| {
            let message = args.get("message").map(ToString::to_string).unwrap_or_default();
            let (upper, lower) = (ctx.flag_bool("upper"), ctx.flag_bool("lower"));
            anyhow::ensure!(!(upper && lower), "--upper and --lower are exclusive");
            let out = if upper {
                message.to_uppercase()
            } else if lower {
                message.to_lowercase()
            } else {
                message
            };
            ctx.reply(out);
            Ok(())
        })
        .alias("say")
        .param(Param::required("message"))
        .flag(Flag::new("lower").default_value(false))
        .flag(Flag::new("upper").default_value(false).alias("u"))
    }

    fn run(parser: &Parser<Recorder>, state: &mut Recorder, line: &[&str]) -> Result<(), CommandError> {
        let (name, rest) = line.split_first().expect("non-empty line");
        parser.parse(name, &tokens(rest))?.run(state)
    }

    #[test]
    fn test_parse_flags_classifies_tokens() {
        let (flags, positionals) =
            parse_flags(&tokens(&["a", "--bool", "-k", "v", "-", "b"])).unwrap();
        assert_eq!(positionals, tokens(&["a", "-", "b"]));
        assert_eq!(flags.get("bool"), Some(&Value::Bool(true)));
        assert_eq!(flags.get("k"), Some(&Value::Str("v".into())));
    }

    #[test]
    fn test_parse_flags_value_missing_at_end() {
        let err = parse_flags(&tokens(&["-k"])).unwrap_err();
        assert!(matches!(err, CommandError::Flag(_)));
    }

    #[test]
    fn test_parse_flags_value_looks_like_flag() {
        let err = parse_flags(&tokens(&["-k", "--other"])).unwrap_err();
        assert_eq!(err.to_string(), "No value was provided for flag -k");
    }

    #[test]
    fn test_parse_flags_double_dash_alone_takes_value() {
        let (flags, positionals) = parse_flags(&tokens(&["--", "x"])).unwrap();
        assert!(positionals.is_empty());
        assert_eq!(flags.get("-"), Some(&Value::Str("x".into())));
    }

    #[test]
    fn test_register_rejects_duplicates_and_spaces() {
        let mut parser = Parser::new();
        parser.register(echo()).unwrap();

        let dup = parser.register(Command::new("say", |_, _| Ok(())));
        assert!(matches!(dup, Err(CommandError::NameConflict(n)) if n == "say"));

        let alias_clash = parser.register(Command::new("talk", |_, _| Ok(())).alias("echo"));
        assert!(matches!(alias_clash, Err(CommandError::NameConflict(_))));

        let spaced = parser.register(Command::new("two words", |_, _| Ok(())));
        assert!(matches!(spaced, Err(CommandError::Invalid(_))));

        let spaced_alias = parser.register(Command::new("ok", |_, _| Ok(())).alias("b ad"));
        assert!(matches!(spaced_alias, Err(CommandError::Invalid(_))));
        assert!(parser.get("ok").is_none());
    }

    #[test]
    fn test_aliases_resolve_to_same_command() {
        let mut parser = Parser::new();
        parser.register(echo()).unwrap();
        for name in ["echo", "say"] {
            let inv = parser.parse(name, &tokens(&["hi"])).unwrap();
            assert_eq!(inv.command.name(), "echo");
        }
    }

    #[test]
    fn test_unknown_command() {
        let parser: Parser<Recorder> = Parser::new();
        let err = parser.parse("nope", &[]).err().unwrap();
        assert_eq!(err.to_string(), "nope is not a registered command or alias.");
    }

    #[test]
    fn test_echo_upper() {
        let mut parser = Parser::new();
        parser.register(echo()).unwrap();
        let mut state = Recorder::default();

        run(&parser, &mut state, &["echo", "--upper", "Hi"]).unwrap();
        run(&parser, &mut state, &["say", "--lower", "Hi"]).unwrap();
        run(&parser, &mut state, &["echo", "Hi"]).unwrap();
        assert_eq!(state.replies, vec!["HI", "hi", "Hi"]);
    }

    #[test]
    fn test_echo_both_flags_is_error() {
        let mut parser = Parser::new();
        parser.register(echo()).unwrap();
        let mut state = Recorder::default();

        let err = run(&parser, &mut state, &["echo", "--lower", "--upper", "Hi"]).unwrap_err();
        assert!(matches!(err, CommandError::Handler(_)));
        assert!(state.replies.is_empty());
    }

    #[test]
    fn test_flag_alias_resolves_to_canonical() {
        let mut parser = Parser::new();
        parser.register(echo()).unwrap();
        let mut state = Recorder::default();
        run(&parser, &mut state, &["echo", "--u", "Hi"]).unwrap();
        assert_eq!(state.replies, vec!["HI"]);
    }

    #[test]
    fn test_unexpected_flag() {
        let mut parser = Parser::new();
        parser.register(echo()).unwrap();
        let mut state = Recorder::default();
        let err = run(&parser, &mut state, &["echo", "--shout", "Hi"]).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected flag passed : shout");
    }

    #[test]
    fn test_missing_required_argument() {
        let mut parser = Parser::new();
        parser.register(echo()).unwrap();
        let mut state = Recorder::default();
        let err = run(&parser, &mut state, &["echo"]).unwrap_err();
        assert!(matches!(err, CommandError::MissingArgument(p) if p == "message"));
    }

    #[test]
    fn test_extra_positionals_are_dropped_and_defaults_fill() {
        let mut parser = Parser::new();
        parser
            .register(
                Command::new("pair", |ctx: &mut Context<'_, Recorder>, args| {
                    let a = args.get("a").map(ToString::to_string).unwrap_or_default();
                    let b = args.get("b").map(ToString::to_string).unwrap_or_default();
                    ctx.reply(format!("{a}/{b}/{}", args.len()));
                    Ok(())
                })
                .param(Param::required("a"))
                .param(Param::optional("b", "dflt")),
            )
            .unwrap();
        let mut state = Recorder::default();
        run(&parser, &mut state, &["pair", "1"]).unwrap();
        run(&parser, &mut state, &["pair", "1", "2", "3"]).unwrap();
        assert_eq!(state.replies, vec!["1/dflt/2", "1/2/2"]);
    }

    #[test]
    fn test_conversion_failure_keeps_raw_value_quirk() {
        let mut parser = Parser::new();
        parser
            .register(
                Command::new("num", |ctx: &mut Context<'_, Recorder>, args| {
                    let shown = match args.get("n") {
                        Some(Value::Int(n)) => format!("int {n}"),
                        Some(other) => format!("raw {other}"),
                        None => "none".to_string(),
                    };
                    ctx.reply(shown);
                    Ok(())
                })
                .param(Param::required("n").converter(to_int)),
            )
            .unwrap();
        let mut state = Recorder::default();
        run(&parser, &mut state, &["num", "7"]).unwrap();
        run(&parser, &mut state, &["num", "seven"]).unwrap();
        assert_eq!(state.replies, vec!["int 7", "raw seven"]);
    }

    #[test]
    fn test_was_passed_is_per_invocation() {
        let mut parser = Parser::new();
        parser
            .register(
                Command::new("probe", |ctx: &mut Context<'_, Recorder>, _| {
                    let size = ctx.flag_int("size").unwrap_or(-1);
                    let passed = ctx.was_passed("size");
                    ctx.reply(format!("{size} {passed}"));
                    Ok(())
                })
                .flag(Flag::new("size").default_value(10_i64).converter(to_int)),
            )
            .unwrap();
        let mut state = Recorder::default();
        run(&parser, &mut state, &["probe", "-size", "3"]).unwrap();
        run(&parser, &mut state, &["probe"]).unwrap();
        assert_eq!(state.replies, vec!["3 true", "10 false"]);
    }

    fn channel_tree() -> Command<Recorder> {
        let open = Command::new("open", |ctx: &mut Context<'_, Recorder>, args| {
            let sub = ctx.is_subcommand();
            ctx.reply(format!("open {:?} {sub}", args.get_int("id")));
            Ok(())
        })
        .alias("o")
        .param(Param::required("id").converter(to_int));
        let list = Command::new("list", |ctx: &mut Context<'_, Recorder>, _| {
            ctx.reply("list".to_string());
            Ok(())
        })
        .alias("ls");

        Command::new("channel", |ctx: &mut Context<'_, Recorder>, _| {
            let sub = ctx.is_subcommand();
            ctx.reply(format!("root {sub}"));
            Ok(())
        })
        .alias("ch")
        .subcommand(open)
        .and_then(|c| c.subcommand(list))
        .unwrap()
    }

    #[test]
    fn test_subcommand_descent() {
        let mut parser = Parser::new();
        parser.register(channel_tree()).unwrap();
        let mut state = Recorder::default();

        run(&parser, &mut state, &["ch", "o", "42"]).unwrap();
        run(&parser, &mut state, &["channel", "ls"]).unwrap();
        run(&parser, &mut state, &["channel", "42"]).unwrap();
        assert_eq!(state.replies, vec!["open Some(42) true", "list", "root false"]);
    }

    #[test]
    fn test_subcommand_conflict_and_removal() {
        let mut root = channel_tree();
        let clash = root.add_subcommand(Command::new("lst", |_, _| Ok(())).alias("ls"));
        assert!(matches!(clash, Err(CommandError::NameConflict(_))));

        assert!(root.remove_subcommand("list").is_some());
        assert!(root.get_subcommand("ls").is_none());
        assert!(root.remove_subcommand("list").is_none());
    }

    #[test]
    fn test_unregister_removes_aliases() {
        let mut parser = Parser::new();
        parser.register(echo()).unwrap();
        assert!(parser.unregister("say").is_some());
        assert!(parser.get("echo").is_none());
        assert!(parser.get("say").is_none());
        assert!(parser.unregister("echo").is_none());
        parser.register(echo()).unwrap();
    }

    struct Basics;

    impl CommandModule<Recorder> for Basics {
        fn name(&self) -> &str {
            "basics"
        }

        fn commands(&self) -> Result<Vec<Command<Recorder>>, CommandError> {
            Ok(vec![echo(), Command::new("ping", |_, _| Ok(()))])
        }
    }

    #[test]
    fn test_load_and_remove_module() {
        let mut parser = Parser::new();
        parser.load_module(&Basics).unwrap();
        assert_eq!(parser.get("ping").and_then(|c| c.module()), Some("basics"));
        assert_eq!(
            parser.commands().iter().map(|c| c.name()).collect::<Vec<_>>(),
            vec!["echo", "ping"]
        );

        parser.remove_module(&Basics);
        assert!(parser.commands().is_empty());
    }

    #[test]
    fn test_load_module_is_all_or_nothing() {
        let mut parser = Parser::new();
        parser.register(Command::new("ping", |_, _| Ok(()))).unwrap();
        assert!(parser.load_module(&Basics).is_err());
        assert!(parser.get("echo").is_none());
        assert!(parser.get("ping").is_some());
    }

    #[test]
    fn test_context_carries_originating_page() {
        let mut parser = Parser::new();
        parser.register(echo()).unwrap();
        let mut state = Recorder::default();

        parser
            .parse("echo", &tokens(&["a"]))
            .unwrap()
            .from_page(Some(3))
            .run(&mut state)
            .unwrap();
        parser.parse("echo", &tokens(&["b"])).unwrap().run(&mut state).unwrap();

        assert_eq!(state.origins, vec![Some(3), None]);
    }

    #[test]
    fn test_usage_line_generated() {
        assert_eq!(echo().usage_line(), "echo <message> [--lower] [--upper]");
    }
}
