//! A small line-oriented shell.
//!
//! Each input line is split on `&` into command groups. Every group is either run
//! in-process as a builtin (`exit`, `cd`, `path`, `echo`, `cat`) or resolved on a
//! search path and started as a child process, optionally with its output
//! redirected to a file by `> target`. All children of a line run in parallel and
//! are waited for before the next line is read.
//!
//! The main entry point is [`Interpreter`]. Whatever goes wrong, the user only ever
//! sees [`error::ERROR_MESSAGE`] on standard error.

mod builtin;
pub mod command;
pub mod env;
pub mod error;
mod external;
mod interpreter;
pub mod lexer;
pub mod parser;
pub mod path;

/// Just a convenient re-export of the interpreter and its per-line report.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::{Interpreter, LineStatus, PROMPT};
