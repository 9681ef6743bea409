use crate::env::Environment;
use crate::error::ShellError;
use crate::parser::CommandGroup;
use std::io::Write;
use std::process::Child;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Output streams lent to a command for the duration of its dispatch.
///
/// Builtins write here directly. Children never see these writers: without a
/// redirection they inherit the interpreter's own standard streams.
pub struct Streams<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
}

/// What dispatching a command left behind.
#[derive(Debug)]
pub enum Outcome {
    /// The command ran to completion in-process.
    Finished,
    /// A child process was started and must be waited for.
    Spawned(Child),
    /// The interpreter must stop.
    Exit,
}

/// Object-safe trait for any command that can be dispatched by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    fn execute(
        self: Box<Self>,
        streams: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<Outcome, ShellError>;
}

/// Factory that tries to create a command for a parsed group.
///
/// Returns `None` when the factory doesn't recognize the group's command name.
/// Implementations can use the environment to resolve executables.
pub trait CommandFactory {
    fn try_create(
        &self,
        env: &Environment,
        group: &CommandGroup,
    ) -> Option<Box<dyn ExecutableCommand>>;
}
