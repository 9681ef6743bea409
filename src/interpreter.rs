//! The line loop: dispatch every group of a line, then join its children.

use crate::command::{CommandFactory, ExecutableCommand, Outcome, Streams};
use crate::env::Environment;
use crate::error::{self, ShellError};
use crate::external::exit_code;
use crate::lexer;
use crate::parser::{self, CommandGroup};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result};
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::Child;

/// Prompt printed before each line in interactive mode.
pub const PROMPT: &str = "wish> ";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate: builtins and `ExternalCommand`.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// What happened while executing one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineStatus {
    /// Children started for the line. Unless `exit` ran, each was waited for.
    pub spawned: usize,
    /// `exit` ran; groups after it on the line were not dispatched.
    pub exit_requested: bool,
}

/// A line-oriented shell interpreter that runs the groups of a line in parallel.
///
/// The interpreter owns an [`Environment`] and a list of [`CommandFactory`] objects
/// that are queried, in order, to create a command for each group. See [`Default`]
/// for the factories included out of the box.
///
/// Example
/// ```
/// use wish::Interpreter;
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// let mut err = Vec::new();
/// sh.execute_line_with_output("echo hello world", &mut out, &mut err);
/// assert_eq!(out, b"hello world\n");
/// assert!(err.is_empty());
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            commands,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// True once `exit` has run; the line loops stop reading.
    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Execute one line against the process's standard output and error.
    pub fn execute_line(&mut self, line: &str) -> LineStatus {
        let stdout = io::stdout();
        let stderr = io::stderr();
        self.execute_line_with_output(line, &mut stdout.lock(), &mut stderr.lock())
    }

    /// Execute one line, sending builtin output and error reports to the given writers.
    ///
    /// Every group is dispatched in order before anything is waited for, then each
    /// child is joined. Children without a redirection inherit the process's own
    /// standard streams, not these writers.
    pub fn execute_line_with_output(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> LineStatus {
        let mut streams = Streams { stdout, stderr };

        // One slot per group; `None` for groups that started no child.
        let mut slots: Vec<Option<Child>> = Vec::new();
        for text in lexer::split_into_groups(line) {
            slots.push(self.dispatch_group(text, &mut streams));
            if self.env.should_exit {
                break;
            }
        }

        let _ = streams.stdout.flush();
        let spawned = slots.iter().filter(|slot| slot.is_some()).count();
        if self.env.should_exit {
            return LineStatus {
                spawned,
                exit_requested: true,
            };
        }

        self.join(slots, streams.stderr);
        LineStatus {
            spawned,
            exit_requested: false,
        }
    }

    /// Tokenize, parse and run or start one group. Returns the child, if one was started.
    fn dispatch_group(&mut self, text: &str, streams: &mut Streams<'_>) -> Option<Child> {
        let tokens = lexer::split_into_tokens(text);
        tracing::trace!(?tokens, "tokenized group");

        let group = match parser::construct_group(tokens) {
            Ok(Some(group)) => group,
            Ok(None) => return None,
            Err(e) => {
                error::report(streams.stderr, &ShellError::from(e));
                return None;
            }
        };

        let Some(cmd) = self.create(&group) else {
            error::report(
                streams.stderr,
                &ShellError::CommandNotFound(group.name().to_string()),
            );
            return None;
        };

        match cmd.execute(streams, &mut self.env) {
            Ok(Outcome::Finished) => None,
            Ok(Outcome::Spawned(child)) => Some(child),
            Ok(Outcome::Exit) => {
                self.env.should_exit = true;
                None
            }
            Err(e) => {
                error::report(streams.stderr, &e);
                None
            }
        }
    }

    fn create(&self, group: &CommandGroup) -> Option<Box<dyn ExecutableCommand>> {
        self.commands
            .iter()
            .find_map(|factory| factory.try_create(&self.env, group))
    }

    /// Wait for every slot that holds a child, in slot order.
    fn join(&self, slots: Vec<Option<Child>>, stderr: &mut dyn Write) {
        for (slot, child) in slots.into_iter().enumerate() {
            let Some(mut child) = child else {
                continue;
            };
            let pid = child.id();
            match child.wait() {
                Ok(status) => tracing::debug!(slot, pid, code = exit_code(status), "child finished"),
                Err(source) => error::report(stderr, &ShellError::Wait { pid, source }),
            }
        }
    }

    /// Read lines from `input` until it ends or `exit` runs. No prompt is printed.
    ///
    /// Lines that are not valid UTF-8 are decoded lossily.
    pub fn run_batch<R: BufRead>(&mut self, input: R) -> io::Result<()> {
        self.read_loop(input, None)
    }

    /// Interactive Read-Eval-Print Loop with line editing and history.
    ///
    /// When stdin is not a terminal the line editor is skipped and the prompt is
    /// written to stdout before every read.
    pub fn repl(&mut self) -> Result<()> {
        if !io::stdin().is_terminal() {
            return Ok(self.read_loop(io::stdin().lock(), Some(PROMPT))?);
        }

        let mut rl = DefaultEditor::new()?;

        while !self.env.should_exit {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    self.execute_line(&line);
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }

    fn read_loop<R: BufRead>(&mut self, mut input: R, prompt: Option<&str>) -> io::Result<()> {
        let mut buf = Vec::new();
        while !self.env.should_exit {
            if let Some(prompt) = prompt {
                let mut stdout = io::stdout().lock();
                stdout.write_all(prompt.as_bytes())?;
                stdout.flush()?;
            }
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            self.execute_line(&line);
        }
        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `exit`, `cd`, `path`, `echo`, `cat`
    /// - external command launcher, resolving on the search path
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Path>::default()),
            Box::new(Factory::<Echo>::default()),
            Box::new(Factory::<Cat>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}
