use crate::path::SearchPath;
use std::env as stdenv;
use std::path::PathBuf;

/// Mutable state owned by the interpreter and lent to commands.
///
/// The environment contains:
/// - `search_path`: directories used to resolve external commands, replaced by `path`.
/// - `current_dir`: the working directory for command execution, changed by `cd`.
/// - `should_exit`: set by `exit`; the line loops stop once they see it.
#[derive(Debug, Clone)]
pub struct Environment {
    pub search_path: SearchPath,
    pub current_dir: PathBuf,
    pub should_exit: bool,
}

impl Environment {
    /// Capture the current working directory and start from the default search path.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            search_path: SearchPath::default(),
            current_dir,
            should_exit: false,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
