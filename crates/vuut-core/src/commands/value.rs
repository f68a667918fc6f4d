use std::fmt;

use anyhow::{Context as _, Result};

/// Converts a raw token into a typed [`Value`].
pub type Converter = fn(&str) -> Result<Value>;

/// A bound argument or flag value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Empty strings, `false` and zero are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

/// Parses a signed integer.
pub fn to_int(raw: &str) -> Result<Value> {
    raw.trim()
        .parse::<i64>()
        .map(Value::Int)
        .with_context(|| format!("'{raw}' is not an integer"))
}

/// Parses a floating point number.
pub fn to_float(raw: &str) -> Result<Value> {
    raw.trim()
        .parse::<f64>()
        .map(Value::Float)
        .with_context(|| format!("'{raw}' is not a number"))
}

/// Accepts `true/false`, `yes/no`, `on/off` and `1/0`, case-insensitively.
pub fn to_bool(raw: &str) -> Result<Value> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
        "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
        _ => anyhow::bail!("'{raw}' is not a boolean"),
    }
}
