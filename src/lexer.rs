//! A module implementing lexical analysis (tokenization) of one input line.
//!
//! A line is first cut into command groups on the parallel separator `&`, then each
//! group is split into tokens on runs of spaces, tabs and newlines. There is no
//! quoting, escaping or expansion: every non-blank run is a token.

use regex::Regex;
use std::sync::LazyLock;

/// Character separating command groups that run in parallel.
pub const PARALLEL_SEPARATOR: char = '&';

/// Literal token marking an output redirection.
pub const REDIRECT_MARKER: &str = ">";

static DELIMITERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\n]+").expect("delimiter pattern is valid"));

/// Represents a token resulting from lexical analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Any run of non-delimiter characters other than the redirection marker.
    Word(String),
    /// Output redirection symbol, `>`.
    RedirectRight,
}

/// Split a line into the raw text of its command groups, in order.
///
/// Empty groups are kept here (`"a & & b"` yields three groups); dropping them is
/// up to whoever consumes the tokens.
pub fn split_into_groups(line: &str) -> Vec<&str> {
    line.split(PARALLEL_SEPARATOR).collect()
}

/// Split one command group into tokens.
///
/// Only a token that is exactly `>` becomes [`Token::RedirectRight`]; `a>b` stays a
/// single word.
pub fn split_into_tokens(group: &str) -> Vec<Token> {
    DELIMITERS
        .split(group)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s == REDIRECT_MARKER {
                Token::RedirectRight
            } else {
                Token::Word(s.to_string())
            }
        })
        .collect()
}
