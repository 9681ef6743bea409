//! Turns the tokens of one command group into a [`CommandGroup`].

use crate::lexer::Token;
use std::path::PathBuf;
use thiserror::Error;

/// One executable invocation: command name, arguments and an optional
/// output redirection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandGroup {
    /// Command name followed by its arguments. Never empty.
    pub argv: Vec<String>,
    /// File that replaces the command's output, if `>` was given.
    pub redirect: Option<PathBuf>,
}

impl CommandGroup {
    /// The command name (`argv[0]`).
    pub fn name(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments after the command name.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }
}

/// Errors that can occur while building a [`CommandGroup`] from tokens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParsingError {
    /// A `>` with no word after it.
    #[error("expected a file name after `>`")]
    MissingRedirectTarget,
}

struct GroupBuilder {
    tokens: Vec<Token>,
    pos: usize,
}

impl GroupBuilder {
    fn from(tokens: Vec<Token>) -> Self {
        GroupBuilder { tokens, pos: 0 }
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Parse a group: word* ('>' word)?
    ///
    /// The first `>` wins. Whatever follows its target is discarded.
    fn build_group(mut self) -> Result<Option<CommandGroup>, ParsingError> {
        let mut argv = Vec::new();
        let mut redirect = None;

        while let Some(token) = self.consume() {
            match token {
                Token::Word(w) => argv.push(w),
                Token::RedirectRight => {
                    redirect = Some(self.parse_redirect_target()?);
                    break;
                }
            }
        }

        if argv.is_empty() {
            // Nothing to run: empty group, or a bare `> file`.
            return Ok(None);
        }

        Ok(Some(CommandGroup { argv, redirect }))
    }

    fn parse_redirect_target(&mut self) -> Result<PathBuf, ParsingError> {
        match self.consume() {
            Some(Token::Word(target)) => Ok(PathBuf::from(target)),
            Some(Token::RedirectRight) | None => Err(ParsingError::MissingRedirectTarget),
        }
    }
}

/// Build a command group from the tokens of one group.
///
/// Returns `Ok(None)` when the group has no command name and should be skipped.
pub fn construct_group(tokens: Vec<Token>) -> Result<Option<CommandGroup>, ParsingError> {
    GroupBuilder::from(tokens).build_group()
}
