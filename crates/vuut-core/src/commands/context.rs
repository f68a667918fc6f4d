use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::command::Command;
use super::value::Value;

/// Implemented by the application state commands run against.
pub trait CommandHost {
    /// Shows `text` on page `origin`, or wherever output goes without one.
    fn reply(&mut self, origin: Option<usize>, text: String);
}

/// Per-invocation execution context.
///
/// Built fresh for every call, so flag values and the "was passed" markers
/// never leak between invocations. `origin` is the page the command was
/// entered on; it stays fixed even if the handler moves focus.
pub struct Context<'a, S> {
    pub state: &'a mut S,
    command: Arc<Command<S>>,
    origin: Option<usize>,
    flags: HashMap<String, Value>,
    passed: HashSet<String>,
}

impl<'a, S> Context<'a, S> {
    pub fn new(command: Arc<Command<S>>, state: &'a mut S, origin: Option<usize>) -> Self {
        Self {
            state,
            command,
            origin,
            flags: HashMap::new(),
            passed: HashSet::new(),
        }
    }

    pub fn origin(&self) -> Option<usize> {
        self.origin
    }

    pub fn command(&self) -> &Command<S> {
        &self.command
    }

    pub fn is_subcommand(&self) -> bool {
        self.command.parent().is_some()
    }

    pub fn flag(&self, name: &str) -> Option<&Value> {
        self.flags.get(name)
    }

    /// Truthiness of the flag; unset flags are false.
    pub fn flag_bool(&self, name: &str) -> bool {
        self.flags.get(name).is_some_and(Value::is_truthy)
    }

    pub fn flag_str(&self, name: &str) -> Option<&str> {
        self.flags.get(name).and_then(Value::as_str)
    }

    pub fn flag_int(&self, name: &str) -> Option<i64> {
        self.flags.get(name).and_then(Value::as_int)
    }

    /// True only when the caller supplied the flag in this invocation.
    pub fn was_passed(&self, name: &str) -> bool {
        self.passed.contains(name)
    }

    pub(crate) fn set_flag(&mut self, name: &str, value: Option<Value>, passed: bool) {
        if let Some(value) = value {
            self.flags.insert(name.to_string(), value);
        }
        if passed {
            self.passed.insert(name.to_string());
        }
    }
}

impl<S: CommandHost> Context<'_, S> {
    /// Replies on the originating page.
    pub fn reply(&mut self, text: impl Into<String>) {
        self.state.reply(self.origin, text.into());
    }
}

/// Positional arguments bound to a command's declared parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: HashMap<String, Value>,
}

impl Args {
    pub(crate) fn insert(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
