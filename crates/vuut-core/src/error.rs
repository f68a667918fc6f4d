//! Error types shared by the command framework and the layout helpers.

use thiserror::Error;

/// Failures raised while registering, parsing, or invoking commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The name did not resolve to a registered command or alias.
    #[error("{0} is not a registered command or alias.")]
    NotFound(String),

    /// A command, alias, or flag with this name is already registered.
    #[error("{0} has already been registered.")]
    NameConflict(String),

    /// Malformed flag syntax, a missing flag value, or an undeclared flag.
    #[error("{0}")]
    Flag(String),

    /// Structural registration violation (whitespace in a name, etc).
    #[error("{0}")]
    Invalid(String),

    /// A declared parameter without a default received no value.
    #[error("missing required argument: {0}")]
    MissingArgument(String),

    /// The bound handler returned an error.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl CommandError {
    pub(crate) fn flag(msg: impl Into<String>) -> Self {
        Self::Flag(msg.into())
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Raised when text fragments cannot be laid out in the requested width.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fragments need {needed} columns but only {available} are available")]
pub struct LayoutError {
    pub needed: usize,
    pub available: usize,
}
