//! Parsed IRC line types.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;
use crate::prefix::Prefix;

use super::nom_parser::tokenize;

/// Where a line came from.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Source {
    /// The line carried a well-formed prefix.
    Prefix(Prefix),
    /// The line carried a prefix that did not match the prefix grammar.
    Malformed(String),
    /// No prefix; the server the session is registered with, if known.
    Server(Option<String>),
}

impl Source {
    /// Sender name: the prefix name, or the fallback server name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Source::Prefix(prefix) => Some(&prefix.name),
            Source::Malformed(_) => None,
            Source::Server(server) => server.as_deref(),
        }
    }

    /// The parsed prefix, if the line had a well-formed one.
    pub fn prefix(&self) -> Option<&Prefix> {
        match self {
            Source::Prefix(prefix) => Some(prefix),
            _ => None,
        }
    }
}

/// One tokenized IRC line.
///
/// # Example
///
/// ```
/// use slirc_client::ParsedLine;
///
/// let line: ParsedLine = ":nick!user@host PRIVMSG #rust :hello world".parse().unwrap();
/// assert_eq!(line.command, "PRIVMSG");
/// assert_eq!(line.params, vec!["#rust", "hello world"]);
/// assert_eq!(line.prefix.name(), Some("nick"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedLine {
    /// The line exactly as received.
    pub raw: String,
    /// Raw `;`-separated message tags; `None` if the line had no tag section.
    pub tags: Option<Vec<String>>,
    /// Origin of the line.
    pub prefix: Source,
    /// Upper-cased command or three-digit numeric.
    pub command: String,
    /// Parameters; the last one may contain spaces.
    pub params: Vec<String>,
}

impl ParsedLine {
    /// Tokenize a complete line.
    ///
    /// `server` is used as the origin when the line has no prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidMessage`] carrying the raw line when
    /// no valid command token is found.
    pub fn parse(line: &str, server: Option<&str>) -> Result<Self, ProtocolError> {
        let tokens = tokenize(line).map_err(|cause| ProtocolError::InvalidMessage {
            string: line.to_owned(),
            cause,
        })?;

        let prefix = match tokens.prefix {
            Some(text) => match Prefix::parse(text) {
                Ok(prefix) => Source::Prefix(prefix),
                Err(_) => Source::Malformed(text.to_owned()),
            },
            None => Source::Server(server.map(str::to_owned)),
        };

        Ok(Self {
            raw: line.to_owned(),
            tags: tokens
                .tags
                .map(|tags| tags.split(';').map(str::to_owned).collect()),
            prefix,
            command: tokens.command.to_ascii_uppercase(),
            params: tokens.params.into_iter().map(str::to_owned).collect(),
        })
    }

    /// Get a parameter by index.
    #[inline]
    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// The numeric code, if the command is a three-digit reply.
    pub fn numeric(&self) -> Option<u16> {
        if self.command.len() == 3 && self.command.bytes().all(|b| b.is_ascii_digit()) {
            self.command.parse().ok()
        } else {
            None
        }
    }
}

impl FromStr for ParsedLine {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParsedLine::parse(s, None)
    }
}

impl fmt::Display for ParsedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MessageParseError;

    #[test]
    fn test_round_trip_components() {
        let line: ParsedLine = ":nick!user@host COMMAND p1 p2 :trailing text".parse().unwrap();
        let prefix = line.prefix.prefix().unwrap();
        assert_eq!(prefix.name, "nick");
        assert_eq!(prefix.user.as_deref(), Some("user"));
        assert_eq!(prefix.host.as_deref(), Some("host"));
        assert_eq!(line.command, "COMMAND");
        assert_eq!(line.params, vec!["p1", "p2", "trailing text"]);
        assert_eq!(line.tags, None);
    }

    #[test]
    fn test_tags_are_kept_raw() {
        let line: ParsedLine = "@time=2024-01-01T00:00:00Z;+draft/x=a\\sb;flag PING :x"
            .parse()
            .unwrap();
        assert_eq!(
            line.tags,
            Some(vec![
                "time=2024-01-01T00:00:00Z".to_owned(),
                "+draft/x=a\\sb".to_owned(),
                "flag".to_owned(),
            ])
        );
    }

    #[test]
    fn test_command_is_uppercased() {
        let line: ParsedLine = "privmsg #a :b".parse().unwrap();
        assert_eq!(line.command, "PRIVMSG");
        assert_eq!(line.raw, "privmsg #a :b");
    }

    #[test]
    fn test_fallback_server() {
        let line = ParsedLine::parse("PING :x", Some("irc.example.net")).unwrap();
        assert_eq!(line.prefix, Source::Server(Some("irc.example.net".to_owned())));
        assert_eq!(line.prefix.name(), Some("irc.example.net"));

        let line = ParsedLine::parse("PING :x", None).unwrap();
        assert_eq!(line.prefix, Source::Server(None));
        assert_eq!(line.prefix.name(), None);
    }

    #[test]
    fn test_malformed_prefix_does_not_fail_line() {
        let line: ParsedLine = ":nick!@host PRIVMSG #a :b".parse().unwrap();
        assert_eq!(line.prefix, Source::Malformed("nick!@host".to_owned()));
        assert_eq!(line.prefix.name(), None);
        assert_eq!(line.command, "PRIVMSG");
    }

    #[test]
    fn test_invalid_command_carries_raw_line() {
        let err = "@a=b :srv 12 foo".parse::<ParsedLine>().unwrap_err();
        match err {
            ProtocolError::InvalidMessage { string, cause } => {
                assert_eq!(string, "@a=b :srv 12 foo");
                assert_eq!(cause, MessageParseError::InvalidCommand("12".to_owned()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_numeric() {
        let line: ParsedLine = ":srv 001 me :Welcome".parse().unwrap();
        assert_eq!(line.numeric(), Some(1));
        assert_eq!(line.param(0), Some("me"));

        let line: ParsedLine = "NOTICE me :x".parse().unwrap();
        assert_eq!(line.numeric(), None);
        assert_eq!(line.param(5), None);
    }
}
