//! Commands run inside the interpreter process: `exit`, `cd`, `path`, `echo`, `cat`.

use crate::command::{CommandFactory, ExecutableCommand, Outcome, Streams};
use crate::env::Environment;
use crate::error::{self, ShellError};
use crate::external::open_redirect_target;
use crate::interpreter::Factory;
use crate::parser::CommandGroup;
use crate::path::split_entries;
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
///
/// Builtins validate their own arguments when created from a [`CommandGroup`] and are
/// executed directly in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "echo" or "cd". Matched case-sensitively.
    fn name() -> &'static str;

    /// Check the arity of `group` and capture what the command needs.
    fn from_group(group: &CommandGroup) -> Result<Self, ShellError>;

    /// Executes the command using the lent output streams and environment.
    fn execute(
        self,
        streams: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<Outcome, ShellError>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        streams: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<Outcome, ShellError> {
        tracing::debug!(builtin = T::name(), "running builtin");
        <T as BuiltinCommand>::execute(*self, streams, env)
    }
}

/// A builtin invoked with arguments it does not accept.
struct InvalidArgs {
    error: ShellError,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _streams: &mut Streams<'_>,
        _env: &mut Environment,
    ) -> Result<Outcome, ShellError> {
        Err(self.error)
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(
        &self,
        _env: &Environment,
        group: &CommandGroup,
    ) -> Option<Box<dyn ExecutableCommand>> {
        if group.name() == T::name() {
            Some(match T::from_group(group) {
                Ok(cmd) => Box::new(cmd),
                Err(error) => Box::new(InvalidArgs { error }),
            })
        } else {
            None
        }
    }
}

/// Stop the interpreter. Accepts no arguments.
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn from_group(group: &CommandGroup) -> Result<Self, ShellError> {
        if !group.args().is_empty() {
            return Err(ShellError::InvalidArguments {
                command: "exit",
                reason: "takes no arguments",
            });
        }
        Ok(Exit)
    }

    fn execute(
        self,
        _streams: &mut Streams<'_>,
        _env: &mut Environment,
    ) -> Result<Outcome, ShellError> {
        Ok(Outcome::Exit)
    }
}

/// Change the current working directory.
pub struct Cd {
    /// directory to switch to; absolute or relative to the current directory.
    pub target: PathBuf,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_group(group: &CommandGroup) -> Result<Self, ShellError> {
        match group.args() {
            [target] => Ok(Cd {
                target: PathBuf::from(target),
            }),
            _ => Err(ShellError::InvalidArguments {
                command: "cd",
                reason: "expected exactly one argument",
            }),
        }
    }

    fn execute(
        self,
        _streams: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<Outcome, ShellError> {
        let new_dir = env.current_dir.join(&self.target);

        env::set_current_dir(&new_dir).map_err(|source| ShellError::ChangeDir {
            path: new_dir.clone(),
            source,
        })?;
        env.current_dir = env::current_dir().map_err(|source| ShellError::ChangeDir {
            path: new_dir,
            source,
        })?;
        Ok(Outcome::Finished)
    }
}

/// Replace the search path with the given directories. No arguments empties it.
///
/// An argument may list several directories separated by `:`.
pub struct Path {
    pub dirs: Vec<PathBuf>,
}

impl BuiltinCommand for Path {
    fn name() -> &'static str {
        "path"
    }

    fn from_group(group: &CommandGroup) -> Result<Self, ShellError> {
        Ok(Path {
            dirs: split_entries(group.args()),
        })
    }

    fn execute(
        self,
        _streams: &mut Streams<'_>,
        env: &mut Environment,
    ) -> Result<Outcome, ShellError> {
        env.search_path.replace(self.dirs);
        tracing::debug!(dirs = ?env.search_path.dirs(), "search path replaced");
        Ok(Outcome::Finished)
    }
}

/// Write the arguments separated by single spaces, followed by a newline.
///
/// Output goes to the redirection target when one is given.
pub struct Echo {
    pub args: Vec<String>,
    pub redirect: Option<PathBuf>,
}

impl BuiltinCommand for Echo {
    fn name() -> &'static str {
        "echo"
    }

    fn from_group(group: &CommandGroup) -> Result<Self, ShellError> {
        Ok(Echo {
            args: group.args().to_vec(),
            redirect: group.redirect.clone(),
        })
    }

    fn execute(
        self,
        streams: &mut Streams<'_>,
        _env: &mut Environment,
    ) -> Result<Outcome, ShellError> {
        let s = self.args.join(" ");
        match &self.redirect {
            Some(path) => {
                let mut file = open_redirect_target(path)?;
                writeln!(file, "{}", s)?;
            }
            None => writeln!(streams.stdout, "{}", s)?,
        }
        Ok(Outcome::Finished)
    }
}

/// Print file(s) to stdout, in order.
///
/// An unreadable file is reported and skipped; the remaining files are still printed.
pub struct Cat {
    pub files: Vec<PathBuf>,
}

impl BuiltinCommand for Cat {
    fn name() -> &'static str {
        "cat"
    }

    fn from_group(group: &CommandGroup) -> Result<Self, ShellError> {
        if group.args().is_empty() {
            return Err(ShellError::InvalidArguments {
                command: "cat",
                reason: "expected at least one file",
            });
        }
        Ok(Cat {
            files: group.args().iter().map(PathBuf::from).collect(),
        })
    }

    fn execute(
        self,
        streams: &mut Streams<'_>,
        _env: &mut Environment,
    ) -> Result<Outcome, ShellError> {
        for path in self.files {
            match fs::read(&path) {
                Ok(contents) => streams.stdout.write_all(&contents)?,
                Err(source) => error::report(streams.stderr, &ShellError::ReadFile { path, source }),
            }
        }
        Ok(Outcome::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ERROR_MESSAGE;
    use crate::lexer::split_into_tokens;
    use crate::parser::construct_group;
    use crate::path::SearchPath;
    use crate::test_support::lock_current_dir;
    use std::env as stdenv;
    use tempfile::TempDir;

    fn group(line: &str) -> CommandGroup {
        construct_group(split_into_tokens(line)).unwrap().unwrap()
    }

    fn test_env() -> Environment {
        Environment {
            search_path: SearchPath::default(),
            current_dir: stdenv::current_dir().unwrap(),
            should_exit: false,
        }
    }

    /// Create the builtin through its factory and run it, capturing both streams.
    fn run<T: BuiltinCommand + 'static>(
        line: &str,
        env: &mut Environment,
    ) -> (Result<Outcome, ShellError>, String, String) {
        let cmd = Factory::<T>::default()
            .try_create(env, &group(line))
            .expect("factory should recognize its own name");
        let mut out = Vec::new();
        let mut err = Vec::new();
        let res = cmd.execute(
            &mut Streams {
                stdout: &mut out,
                stderr: &mut err,
            },
            env,
        );
        (
            res,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_factory_ignores_other_names() {
        let env = test_env();
        assert!(Factory::<Echo>::default().try_create(&env, &group("ls")).is_none());
        assert!(Factory::<Cd>::default().try_create(&env, &group("CD x")).is_none());
    }

    #[test]
    fn test_exit_without_arguments() {
        let mut env = test_env();
        let (res, out, _) = run::<Exit>("exit", &mut env);
        assert!(matches!(res, Ok(Outcome::Exit)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_exit_with_arguments_is_an_error() {
        let mut env = test_env();
        let (res, _, _) = run::<Exit>("exit 1", &mut env);
        assert!(matches!(res, Err(ShellError::InvalidArguments { .. })));
    }

    #[test]
    fn test_echo_joins_with_single_space() {
        let mut env = test_env();
        let (res, out, _) = run::<Echo>("echo a   b\tc", &mut env);
        assert!(matches!(res, Ok(Outcome::Finished)));
        assert_eq!(out, "a b c\n");
    }

    #[test]
    fn test_echo_without_arguments_prints_newline() {
        let mut env = test_env();
        let (_, out, _) = run::<Echo>("echo", &mut env);
        assert_eq!(out, "\n");
    }

    #[test]
    fn test_echo_redirect_writes_file_only() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("out.txt");
        fs::write(&target, "previous contents that must disappear\n").unwrap();

        let mut env = test_env();
        let line = format!("echo a b c > {}", target.display());
        let (res, out, _) = run::<Echo>(&line, &mut env);

        assert!(res.is_ok());
        assert!(out.is_empty());
        assert_eq!(fs::read_to_string(&target).unwrap(), "a b c\n");
    }

    #[test]
    fn test_echo_redirect_open_failure() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("missing_dir").join("out.txt");

        let mut env = test_env();
        let line = format!("echo hi > {}", target.display());
        let (res, out, _) = run::<Echo>(&line, &mut env);

        assert!(matches!(res, Err(ShellError::Redirect { .. })));
        assert!(out.is_empty());
        assert!(!target.exists());
    }

    #[test]
    fn test_path_replaces_search_path() {
        let mut env = test_env();
        let (res, _, _) = run::<Path>("path /opt/bin a:b", &mut env);
        assert!(res.is_ok());
        assert_eq!(
            env.search_path.dirs(),
            [
                PathBuf::from("/opt/bin"),
                PathBuf::from("a"),
                PathBuf::from("b")
            ]
        );

        let (res, _, _) = run::<Path>("path", &mut env);
        assert!(res.is_ok());
        assert!(env.search_path.is_empty());
    }

    #[test]
    fn test_cd_to_absolute_path() {
        let _lock = lock_current_dir();
        let temp = TempDir::new().expect("failed to create temp dir");
        let canonical_temp = fs::canonicalize(temp.path()).expect("canonicalize failed");
        let orig = stdenv::current_dir().unwrap();

        let mut env = test_env();
        let (res, _, _) = run::<Cd>(&format!("cd {}", canonical_temp.display()), &mut env);
        let new_cwd = stdenv::current_dir().unwrap();
        stdenv::set_current_dir(&orig).expect("failed to restore cwd");

        assert!(res.is_ok());
        assert_eq!(fs::canonicalize(new_cwd).unwrap(), canonical_temp);
        assert_eq!(env.current_dir, canonical_temp);
    }

    #[test]
    fn test_cd_relative_to_current_dir() {
        let _lock = lock_current_dir();
        let temp = TempDir::new().expect("failed to create temp dir");
        let canonical_temp = fs::canonicalize(temp.path()).unwrap();
        fs::create_dir(canonical_temp.join("sub")).unwrap();
        let orig = stdenv::current_dir().unwrap();

        let mut env = test_env();
        env.current_dir = canonical_temp.clone();
        let (res, _, _) = run::<Cd>("cd sub", &mut env);
        let new_cwd = stdenv::current_dir().unwrap();
        stdenv::set_current_dir(&orig).expect("failed to restore cwd");

        assert!(res.is_ok());
        assert_eq!(new_cwd, canonical_temp.join("sub"));
    }

    #[test]
    fn test_cd_through_symlink_then_parent() {
        let _lock = lock_current_dir();
        let temp = TempDir::new().unwrap();
        let base = fs::canonicalize(temp.path()).unwrap();
        fs::create_dir_all(base.join("a").join("b")).unwrap();
        std::os::unix::fs::symlink(base.join("a").join("b"), base.join("link")).unwrap();
        let orig = stdenv::current_dir().unwrap();

        let mut env = test_env();
        env.current_dir = base.clone();
        let (res, _, _) = run::<Cd>("cd link/..", &mut env);
        let new_cwd = stdenv::current_dir().unwrap();
        stdenv::set_current_dir(&orig).expect("failed to restore cwd");

        assert!(res.is_ok());
        // The kernel follows the link first, so `..` is the link target's parent.
        assert_eq!(new_cwd, base.join("a"));
        assert_eq!(env.current_dir, base.join("a"));
    }

    #[test]
    fn test_cd_arity_errors_leave_cwd_alone() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();

        for line in ["cd", "cd /tmp /"] {
            let (res, out, _) = run::<Cd>(line, &mut env);
            assert!(matches!(res, Err(ShellError::InvalidArguments { .. })));
            assert!(out.is_empty());
            assert_eq!(stdenv::current_dir().unwrap(), orig);
            assert_eq!(env.current_dir, orig);
        }
    }

    #[test]
    fn test_cd_nonexistent_path_errors() {
        let _lock = lock_current_dir();
        let orig = stdenv::current_dir().unwrap();
        let mut env = test_env();

        let line = format!("cd nonexistent_dir_for_wish_test_{}", std::process::id());
        let (res, _, _) = run::<Cd>(&line, &mut env);

        assert!(matches!(res, Err(ShellError::ChangeDir { .. })));
        assert_eq!(stdenv::current_dir().unwrap(), orig);
    }

    #[test]
    fn test_cat_concatenates_in_order() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::write(&a, "hello\n").unwrap();
        fs::write(&b, "world\nno newline").unwrap();

        let mut env = test_env();
        let line = format!("cat {} {}", a.display(), b.display());
        let (res, out, err) = run::<Cat>(&line, &mut env);

        assert!(res.is_ok());
        assert_eq!(out, "hello\nworld\nno newline");
        assert!(err.is_empty());
    }

    #[test]
    fn test_cat_reports_each_unreadable_file_and_continues() {
        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("good");
        fs::write(&good, "ok\n").unwrap();
        let missing1 = tmp.path().join("missing1");
        let missing2 = tmp.path().join("missing2");

        let mut env = test_env();
        let line = format!(
            "cat {} {} {}",
            missing1.display(),
            good.display(),
            missing2.display()
        );
        let (res, out, err) = run::<Cat>(&line, &mut env);

        assert!(res.is_ok());
        assert_eq!(out, "ok\n");
        assert_eq!(err, ERROR_MESSAGE.repeat(2));
    }

    #[test]
    fn test_cat_without_files_is_an_error() {
        let mut env = test_env();
        let (res, out, _) = run::<Cat>("cat", &mut env);
        assert!(matches!(res, Err(ShellError::InvalidArguments { .. })));
        assert!(out.is_empty());
    }
}
