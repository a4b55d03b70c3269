//! Nom-based IRC line tokenizer.
//!
//! A line is split on single spaces and empty tokens are skipped. The
//! leading tokens are then classified left to right, each stage consuming
//! at most one token:
//!
//! ```text
//! [@tags] [:prefix] <command> [params...] [:trailing]
//! ```
//!
//! The trailing parameter keeps the raw remainder of the line, including
//! any runs of spaces inside it.

use nom::{
    branch::alt,
    bytes::complete::{take_while1, take_while_m_n},
    character::complete::char,
    combinator::all_consuming,
    error::Error,
    sequence::preceded,
    IResult,
};

use crate::error::MessageParseError;

type ParseResult<'a> = IResult<&'a str, &'a str, Error<&'a str>>;

/// A sigil followed by at least one character; returns the text after it.
fn sigil_token(sigil: char, word: &str) -> Option<&str> {
    let parsed: ParseResult<'_> =
        all_consuming(preceded(char(sigil), take_while1(|_: char| true)))(word);
    parsed.ok().map(|(_, body)| body)
}

/// `@tags` token.
fn tags_token(word: &str) -> Option<&str> {
    sigil_token('@', word)
}

/// `:prefix` token.
fn prefix_token(word: &str) -> Option<&str> {
    sigil_token(':', word)
}

/// Command token: one or more ASCII letters, or exactly three digits.
fn command_token(word: &str) -> Option<&str> {
    let parsed: ParseResult<'_> = all_consuming(alt((
        take_while1(|c: char| c.is_ascii_alphabetic()),
        take_while_m_n(3, 3, |c: char| c.is_ascii_digit()),
    )))(word);
    parsed.ok().map(|(_, command)| command)
}

/// The tokens of one line, borrowed from it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawTokens<'a> {
    /// Tag text without the leading `@`, unsplit.
    pub tags: Option<&'a str>,
    /// Prefix text without the leading `:`.
    pub prefix: Option<&'a str>,
    /// Command as written (case preserved).
    pub command: &'a str,
    /// Positional parameters; the trailing one has its colon stripped.
    pub params: Vec<&'a str>,
}

/// Tokenize one complete line (no terminator).
pub(crate) fn tokenize(line: &str) -> Result<RawTokens<'_>, MessageParseError> {
    let mut offset = 0;
    let mut words = line
        .split(' ')
        .map(|word| {
            let start = offset;
            offset += word.len() + 1;
            (start, word)
        })
        .filter(|(_, word)| !word.is_empty())
        .peekable();

    let first = match words.peek() {
        Some(&(_, word)) => word,
        None => return Err(MessageParseError::EmptyMessage),
    };

    let tags = tags_token(first);
    if tags.is_some() {
        words.next();
    }

    let prefix = words.peek().and_then(|&(_, word)| prefix_token(word));
    if prefix.is_some() {
        words.next();
    }

    let command = match words.next() {
        Some((_, word)) => {
            command_token(word).ok_or_else(|| MessageParseError::InvalidCommand(word.to_owned()))?
        }
        None => return Err(MessageParseError::InvalidCommand(String::new())),
    };

    let mut params = Vec::new();
    for (start, word) in words {
        if word.starts_with(':') {
            // Raw tokens joined by single spaces are exactly the rest of the line.
            params.push(&line[start + 1..]);
            break;
        }
        params.push(word);
    }

    Ok(RawTokens {
        tags,
        prefix,
        command,
        params,
    })
}
