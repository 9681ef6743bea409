//! The search path and command name resolution.

use nix::unistd::{AccessFlags, access};
use std::path::{Path, PathBuf};

/// Directories searched when no `path` builtin has run yet.
pub const DEFAULT_SEARCH_PATH: [&str; 2] = ["/bin", "/usr/bin"];

/// Ordered list of directories probed to resolve a bare command name.
///
/// Owned by the [`Environment`](crate::env::Environment); the `path` builtin is
/// its only writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Replace the whole list. An empty iterator leaves nothing to search.
    pub fn replace<I, P>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        *self = Self::new(dirs);
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Resolve `name` to the first `<dir>/<name>` that the current user may execute.
    ///
    /// Directories are probed in list order. The name is appended verbatim after a
    /// single `/`, so an absolute name never escapes the search path.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }
        let found = self
            .dirs
            .iter()
            .map(|dir| PathBuf::from(format!("{}/{}", dir.display(), name)))
            .find(|candidate| is_executable(candidate));
        tracing::trace!(name, ?found, "resolved command");
        found
    }
}

/// Split `path` builtin arguments into directories.
///
/// Each argument may hold several `:`-separated entries; empty entries are dropped.
pub fn split_entries<S: AsRef<str>>(args: &[S]) -> Vec<PathBuf> {
    args.iter()
        .flat_map(|arg| arg.as_ref().split(':'))
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}

impl Default for SearchPath {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_PATH)
    }
}

fn is_executable(path: &Path) -> bool {
    access(path, AccessFlags::X_OK).is_ok()
}
