use std::collections::HashMap;
use std::fmt;
use std::iter;
use std::sync::Arc;

use super::context::{Args, Context};
use super::flag::Flag;
use super::value::{Converter, Value};
use crate::error::CommandError;

/// Callable bound to a command.
pub type Handler<S> = Arc<dyn Fn(&mut Context<'_, S>, &Args) -> anyhow::Result<()> + Send + Sync>;

/// One declared positional parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub(crate) name: String,
    pub(crate) default: Option<Value>,
    pub(crate) converter: Option<Converter>,
}

impl Param {
    /// A parameter that must receive a value.
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            converter: None,
        }
    }

    /// A parameter that falls back to `default` when unbound.
    pub fn optional(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
            converter: None,
        }
    }

    #[must_use]
    pub fn converter(mut self, converter: Converter) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A named, invocable command with flags and optional subcommands.
pub struct Command<S> {
    name: String,
    aliases: Vec<String>,
    usage: Option<String>,
    help: Option<String>,
    module: Option<String>,
    parent: Option<String>,
    params: Vec<Param>,
    flags: Vec<Flag>,
    subcommands: HashMap<String, Arc<Command<S>>>,
    subcommand_aliases: HashMap<String, String>,
    handler: Handler<S>,
}

impl<S> Command<S> {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut Context<'_, S>, &Args) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            usage: None,
            help: None,
            module: None,
            parent: None,
            params: Vec::new(),
            flags: Vec::new(),
            subcommands: HashMap::new(),
            subcommand_aliases: HashMap::new(),
            handler: Arc::new(handler),
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    #[must_use]
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    #[must_use]
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    /// Attaches `sub` under this command.
    ///
    /// # Errors
    /// `Invalid` for whitespace in a name, `NameConflict` when the name or
    /// an alias is already used by a sibling.
    pub fn subcommand(mut self, sub: Command<S>) -> Result<Self, CommandError> {
        self.add_subcommand(sub)?;
        Ok(self)
    }

    pub fn add_subcommand(&mut self, mut sub: Command<S>) -> Result<(), CommandError> {
        sub.validate()?;
        for key in sub.names() {
            if self.subcommand_aliases.contains_key(key) {
                return Err(CommandError::NameConflict(key.to_string()));
            }
        }

        sub.parent = Some(self.name.clone());
        let name = sub.name.clone();
        for key in sub.names() {
            self.subcommand_aliases.insert(key.to_string(), name.clone());
        }
        self.subcommands.insert(name, Arc::new(sub));
        Ok(())
    }

    /// Removes a subcommand and every alias pointing at it.
    pub fn remove_subcommand(&mut self, name: &str) -> Option<Arc<Command<S>>> {
        let removed = self.subcommands.remove(name)?;
        self.subcommand_aliases.retain(|_, target| target != name);
        Some(removed)
    }

    /// Resolves a subcommand through its alias table.
    pub fn get_subcommand(&self, name: &str) -> Option<&Arc<Command<S>>> {
        self.subcommand_aliases
            .get(name)
            .and_then(|canonical| self.subcommands.get(canonical))
    }

    pub fn subcommands(&self) -> Vec<&Command<S>> {
        let mut subs: Vec<_> = self.subcommands.values().map(AsRef::as_ref).collect();
        subs.sort_by(|a, b| a.name.cmp(&b.name));
        subs
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// The declared usage string, or one generated from params and flags.
    pub fn usage_line(&self) -> String {
        if let Some(usage) = &self.usage {
            return usage.clone();
        }

        let mut parts = Vec::new();
        if let Some(parent) = &self.parent {
            parts.push(parent.clone());
        }
        parts.push(self.name.clone());
        for param in &self.params {
            if param.is_required() {
                parts.push(format!("<{}>", param.name));
            } else {
                parts.push(format!("[{}]", param.name));
            }
        }
        parts.extend(self.flags.iter().map(Flag::signature));
        parts.join(" ")
    }

    pub(crate) fn set_module(&mut self, module: &str) {
        self.module = Some(module.to_string());
    }

    /// Canonical name followed by aliases.
    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    pub(crate) fn validate(&self) -> Result<(), CommandError> {
        if !is_valid_name(&self.name) {
            return Err(CommandError::invalid(format!(
                "Command name '{}' cannot be empty or contain spaces.",
                self.name
            )));
        }
        if let Some(alias) = self.aliases.iter().find(|a| !is_valid_name(a)) {
            return Err(CommandError::invalid(format!(
                "Command alias '{alias}' cannot be empty or contain spaces."
            )));
        }

        let mut seen: Vec<&str> = Vec::new();
        for key in self.names() {
            if seen.contains(&key) {
                return Err(CommandError::NameConflict(key.to_string()));
            }
            seen.push(key);
        }

        let mut flag_names: Vec<&str> = Vec::new();
        for flag in &self.flags {
            for key in iter::once(&flag.name).chain(flag.aliases.iter()) {
                if !is_valid_name(key) {
                    return Err(CommandError::flag(format!(
                        "Flag name '{key}' cannot be empty or contain spaces."
                    )));
                }
                if flag_names.contains(&key.as_str()) {
                    return Err(CommandError::NameConflict(key.clone()));
                }
                flag_names.push(key);
            }
        }
        Ok(())
    }

    fn resolve_flag(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.matches(name))
    }

    /// Binds positionals and flags into `ctx`, then runs the handler.
    ///
    /// Positionals are matched to declared params in order; extra
    /// positionals are ignored. A converter that fails leaves the raw
    /// string in place and the call proceeds.
    ///
    /// # Errors
    /// `MissingArgument` for an unbound param without default, `Flag` for
    /// an undeclared flag, `Handler` when the handler fails.
    pub fn invoke(
        &self,
        ctx: &mut Context<'_, S>,
        positionals: Vec<String>,
        flags: HashMap<String, Value>,
    ) -> Result<(), CommandError> {
        let mut args = Args::default();
        let mut positionals = positionals.into_iter();

        for param in &self.params {
            match positionals.next() {
                Some(raw) => {
                    let value = convert_or_keep(&param.name, raw, param.converter);
                    args.insert(&param.name, value);
                }
                None => match &param.default {
                    Some(default) => args.insert(&param.name, default.clone()),
                    None => return Err(CommandError::MissingArgument(param.name.clone())),
                },
            }
        }

        let mut supplied: HashMap<&str, Value> = HashMap::new();
        for (name, value) in flags {
            let Some(flag) = self.resolve_flag(&name) else {
                return Err(CommandError::flag(format!("Unexpected flag passed : {name}")));
            };
            supplied.insert(flag.name.as_str(), value);
        }

        for flag in &self.flags {
            match supplied.remove(flag.name.as_str()) {
                Some(value) => {
                    let value = match (value, flag.converter) {
                        (Value::Str(raw), Some(converter)) => {
                            convert_or_keep(&flag.name, raw, Some(converter))
                        }
                        (value, _) => value,
                    };
                    ctx.set_flag(&flag.name, Some(value), true);
                }
                None => ctx.set_flag(&flag.name, flag.default.clone(), false),
            }
        }

        (self.handler)(ctx, &args).map_err(CommandError::Handler)
    }
}

fn convert_or_keep(name: &str, raw: String, converter: Option<Converter>) -> Value {
    let Some(converter) = converter else {
        return Value::Str(raw);
    };
    match converter(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(argument = name, error = %err, "conversion failed, keeping raw value");
            Value::Str(raw)
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

impl<S> fmt::Debug for Command<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("parent", &self.parent)
            .field("module", &self.module)
            .field("params", &self.params)
            .field("flags", &self.flags)
            .field("subcommands", &self.subcommands.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
