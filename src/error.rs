//! Error taxonomy and the single-channel error reporter.
//!
//! Every failure in the interpreter ends up as a [`ShellError`]. At the interface
//! boundary all of them look the same: [`report`] writes [`ERROR_MESSAGE`] to the
//! error stream and nothing else. The detailed message is only visible in the
//! debug log.

use crate::parser::ParsingError;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// The only error text the interpreter ever prints.
pub const ERROR_MESSAGE: &str = "An error has occurred\n";

/// Coarse classification of a [`ShellError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: dangling `>`, wrong builtin arity.
    Syntax,
    /// The command name did not resolve on the search path.
    Resolution,
    /// A file or directory could not be opened, read or entered.
    Resource,
    /// Creating, launching or waiting for a child failed.
    Process,
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParsingError),

    #[error("{command}: {reason}")]
    InvalidArguments {
        command: &'static str,
        reason: &'static str,
    },

    #[error("{0}: command not found")]
    CommandNotFound(String),

    #[error("cannot open redirection target {}: {source}", path.display())]
    Redirect { path: PathBuf, source: io::Error },

    #[error("cd: {}: {source}", path.display())]
    ChangeDir { path: PathBuf, source: io::Error },

    #[error("cat: {}: {source}", path.display())]
    ReadFile { path: PathBuf, source: io::Error },

    #[error("failed to launch {}: {source}", program.display())]
    Spawn { program: PathBuf, source: io::Error },

    #[error("failed to wait for child {pid}: {source}")]
    Wait { pid: u32, source: io::Error },

    #[error("output error: {0}")]
    Output(#[from] io::Error),
}

impl ShellError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShellError::Parse(_) | ShellError::InvalidArguments { .. } => ErrorKind::Syntax,
            ShellError::CommandNotFound(_) => ErrorKind::Resolution,
            ShellError::Redirect { .. }
            | ShellError::ChangeDir { .. }
            | ShellError::ReadFile { .. }
            | ShellError::Output(_) => ErrorKind::Resource,
            ShellError::Spawn { .. } | ShellError::Wait { .. } => ErrorKind::Process,
        }
    }
}

/// Report `err` on the error channel.
///
/// Writes the fixed [`ERROR_MESSAGE`] to `stderr`. A failure to write the message
/// itself is ignored: there is nowhere left to report it.
pub fn report(stderr: &mut dyn Write, err: &ShellError) {
    tracing::debug!(kind = ?err.kind(), error = %err, "reporting error");
    let _ = stderr.write_all(ERROR_MESSAGE.as_bytes());
    let _ = stderr.flush();
}
