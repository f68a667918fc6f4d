use super::value::{Converter, Value};

/// Declaration of a command flag. Holds no per-call value.
#[derive(Debug, Clone)]
pub struct Flag {
    pub(crate) name: String,
    pub(crate) default: Option<Value>,
    pub(crate) aliases: Vec<String>,
    pub(crate) converter: Option<Converter>,
    pub(crate) description: Option<String>,
}

impl Flag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            aliases: Vec::new(),
            converter: None,
            description: None,
        }
    }

    /// Value used when the flag is not supplied.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Applied to supplied values only; defaults are used as declared.
    #[must_use]
    pub fn converter(mut self, converter: Converter) -> Self {
        self.converter = Some(converter);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn help(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Boolean flags are written `--name`, value flags `-name <value>`.
    pub fn is_switch(&self) -> bool {
        matches!(self.default, Some(Value::Bool(_)))
    }

    pub(crate) fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    pub(crate) fn signature(&self) -> String {
        if self.is_switch() {
            format!("[--{}]", self.name)
        } else {
            format!("[-{} <value>]", self.name)
        }
    }
}
