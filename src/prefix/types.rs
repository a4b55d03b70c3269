//! IRC message prefix types.
//!
//! A prefix identifies the origin of a message. The client accepts the
//! extended form used by IRCX-style networks:
//!
//! ```text
//! name [ '!' user ] [ '@' host ] [ '$' server ]
//! ```
//!
//! Each component is a non-empty run of characters other than `!`, `@`
//! and `$`. A bare server name parses as a prefix with only `name` set.

use std::fmt;
use std::str::FromStr;

use nom::{
    bytes::complete::is_not,
    character::complete::char,
    combinator::{all_consuming, opt},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::MessageParseError;

const DELIMITERS: &str = "!@$";

/// A parsed IRC message prefix.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Prefix {
    /// The prefix text exactly as received (without the leading `:`).
    pub source: String,
    /// Nickname or server name.
    pub name: String,
    /// Username (ident).
    pub user: Option<String>,
    /// Hostname.
    pub host: Option<String>,
    /// Server the user is connected through.
    pub server: Option<String>,
}

type Parts<'a> = (&'a str, Option<&'a str>, Option<&'a str>, Option<&'a str>);

fn component(input: &str) -> IResult<&str, &str> {
    is_not(DELIMITERS)(input)
}

fn parts(input: &str) -> IResult<&str, Parts<'_>> {
    all_consuming(tuple((
        component,
        opt(preceded(char('!'), component)),
        opt(preceded(char('@'), component)),
        opt(preceded(char('$'), component)),
    )))(input)
}

impl Prefix {
    /// Parse a prefix string (leading `:` already stripped).
    ///
    /// # Errors
    ///
    /// Returns [`MessageParseError::InvalidPrefix`] if the text does not
    /// match the prefix grammar, e.g. an empty component (`nick!@host`) or
    /// components out of order (`nick@host!user`).
    pub fn parse(s: &str) -> Result<Self, MessageParseError> {
        let (_, (name, user, host, server)) =
            parts(s).map_err(|_| MessageParseError::InvalidPrefix(s.to_owned()))?;

        Ok(Self {
            source: s.to_owned(),
            name: name.to_owned(),
            user: user.map(str::to_owned),
            host: host.map(str::to_owned),
            server: server.map(str::to_owned),
        })
    }

    /// Whether this prefix carries user identity beyond a bare name.
    pub fn is_user(&self) -> bool {
        self.user.is_some() || self.host.is_some()
    }

    /// `user@host`, if both are present.
    ///
    /// # Example
    ///
    /// ```
    /// use slirc_client::Prefix;
    ///
    /// let p = Prefix::parse("nick!ident@host.example").unwrap();
    /// assert_eq!(p.address().as_deref(), Some("ident@host.example"));
    /// assert_eq!(p.full_address().as_deref(), Some("nick!ident@host.example"));
    /// ```
    pub fn address(&self) -> Option<String> {
        match (&self.user, &self.host) {
            (Some(user), Some(host)) => Some(format!("{}@{}", user, host)),
            _ => None,
        }
    }

    /// `nick!user@host`, if user and host are present.
    pub fn full_address(&self) -> Option<String> {
        self.address()
            .map(|address| format!("{}!{}", self.name, address))
    }
}

impl FromStr for Prefix {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prefix::parse(s)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_name_only() {
        let p = Prefix::parse("irc.example.net").unwrap();
        assert_eq!(p.name, "irc.example.net");
        assert_eq!(p.user, None);
        assert_eq!(p.host, None);
        assert_eq!(p.server, None);
        assert!(!p.is_user());
        assert_eq!(p.address(), None);
    }

    #[test]
    fn test_parse_nick_user_host() {
        let p = Prefix::parse("nick!user@host.com").unwrap();
        assert_eq!(p.source, "nick!user@host.com");
        assert_eq!(p.name, "nick");
        assert_eq!(p.user.as_deref(), Some("user"));
        assert_eq!(p.host.as_deref(), Some("host.com"));
        assert_eq!(p.server, None);
        assert!(p.is_user());
    }

    #[test]
    fn test_parse_with_server() {
        let p = Prefix::parse("nick!user@host$hub.example").unwrap();
        assert_eq!(p.server.as_deref(), Some("hub.example"));
    }

    #[test]
    fn test_optional_components_are_independent() {
        let p = Prefix::parse("nick@host").unwrap();
        assert_eq!(p.user, None);
        assert_eq!(p.host.as_deref(), Some("host"));

        let p = Prefix::parse("nick!user").unwrap();
        assert_eq!(p.user.as_deref(), Some("user"));
        assert_eq!(p.host, None);
        assert_eq!(p.address(), None);

        let p = Prefix::parse("nick$server").unwrap();
        assert_eq!(p.server.as_deref(), Some("server"));
    }

    #[test]
    fn test_address_substitutes_host() {
        let p = Prefix::parse("alice!al@example.org").unwrap();
        assert_eq!(p.address().as_deref(), Some("al@example.org"));
        assert_eq!(p.full_address().as_deref(), Some("alice!al@example.org"));
    }

    #[test]
    fn test_malformed_prefixes() {
        for bad in ["", "!user@host", "nick!@host", "nick@host!user", "nick!a!b", "nick@"] {
            assert_eq!(
                Prefix::parse(bad),
                Err(MessageParseError::InvalidPrefix(bad.to_owned())),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_display_is_source() {
        let p: Prefix = "nick!user@host".parse().unwrap();
        assert_eq!(p.to_string(), "nick!user@host");
    }
}
