//! Command parsing, registration, and dispatch.
//!
//! Commands are declared with an explicit parameter schema and flag list,
//! registered on a [`Parser`], and invoked through the [`Invocation`]
//! returned by [`Parser::parse`]:
//!
//! ```ignore
//! let inv = parser.parse("echo", &["--upper".into(), "hi".into()])?;
//! inv.run(&mut state)?;
//! ```
//!
//! The registry is generic over the state type `S` the handlers mutate.

mod command;
mod context;
mod flag;
mod parser;
mod value;

pub use command::{Command, Handler, Param};
pub use context::{Args, CommandHost, Context};
pub use flag::Flag;
pub use parser::{CommandModule, Invocation, Parser, parse_flags};
pub use value::{Converter, Value, to_bool, to_float, to_int};
