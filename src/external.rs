//! Launching resolved executables as child processes.

use crate::command::{CommandFactory, ExecutableCommand, ExitCode, Outcome, Streams};
use crate::env::Environment;
use crate::error::ShellError;
use crate::interpreter::Factory;
use crate::parser::CommandGroup;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Command that is not a builtin, resolved to an executable on the search path.
pub struct ExternalCommand {
    program: PathBuf,
    argv: Vec<String>,
    redirect: Option<PathBuf>,
}

impl ExternalCommand {
    pub fn new(program: PathBuf, group: &CommandGroup) -> Self {
        Self {
            program,
            argv: group.argv.clone(),
            redirect: group.redirect.clone(),
        }
    }

    /// Standard output and standard error for the child.
    ///
    /// Both go to the redirection target when there is one; otherwise the child
    /// shares the interpreter's streams.
    fn output_stdio(&self) -> Result<(Stdio, Stdio), ShellError> {
        match &self.redirect {
            Some(path) => {
                let file = open_redirect_target(path)?;
                let err_file = file.try_clone().map_err(|source| ShellError::Redirect {
                    path: path.clone(),
                    source,
                })?;
                Ok((Stdio::from(file), Stdio::from(err_file)))
            }
            None => Ok((Stdio::inherit(), Stdio::inherit())),
        }
    }
}

impl CommandFactory for Factory<ExternalCommand> {
    fn try_create(
        &self,
        env: &Environment,
        group: &CommandGroup,
    ) -> Option<Box<dyn ExecutableCommand>> {
        let program = env.search_path.resolve(group.name())?;
        Some(Box::new(ExternalCommand::new(program, group)))
    }
}

impl ExecutableCommand for ExternalCommand {
    /// Start the child and hand it back without waiting for it.
    fn execute(
        self: Box<Self>,
        streams: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<Outcome, ShellError> {
        // Builtin output written so far must land before anything the child prints.
        streams.stdout.flush()?;

        let (stdout, stderr) = self.output_stdio()?;
        let child = Command::new(&self.program)
            .arg0(&self.argv[0])
            .args(&self.argv[1..])
            .stdout(stdout)
            .stderr(stderr)
            .current_dir(&env.current_dir)
            .spawn()
            .map_err(|source| ShellError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        tracing::debug!(pid = child.id(), program = %self.program.display(), "spawned child");
        Ok(Outcome::Spawned(child))
    }
}

/// Open `path` for output, creating it with mode 0644 or truncating it.
pub fn open_redirect_target(path: &Path) -> Result<File, ShellError> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)
        .map_err(|source| ShellError::Redirect {
            path: path.to_path_buf(),
            source,
        })
}

/// Exit code of a finished child, with signal terminations reported shell-style.
pub fn exit_code(exit_status: ExitStatus) -> ExitCode {
    match exit_status.code() {
        Some(x) => x,
        None => terminated_by_signal(exit_status),
    }
}

fn terminated_by_signal(exit_status: ExitStatus) -> ExitCode {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else if ExitStatusExt::core_dumped(&exit_status) {
        255
    } else {
        -1
    }
}
