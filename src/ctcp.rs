//! CTCP (Client-to-Client Protocol) framing.
//!
//! CTCP messages travel inside PRIVMSG and NOTICE text, wrapped in `\x01`
//! delimiters. A PRIVMSG frame is a request, a NOTICE frame a reply, and
//! `ACTION` is the `/me` command.
//!
//! # Reference
//! - CTCP: <https://modern.ircdocs.horse/ctcp.html>
//!
//! # Example
//!
//! ```
//! use slirc_client::ctcp::{CtcpFrame, CtcpKind};
//!
//! let frame = CtcpFrame::parse("\x01ACTION waves hello\x01").unwrap();
//! assert_eq!(frame.kind(), CtcpKind::Action);
//! assert_eq!(frame.text, "waves hello");
//!
//! // An empty frame is plain text.
//! assert!(CtcpFrame::parse("\x01\x01").is_none());
//! ```

use std::fmt;

/// The CTCP delimiter character (`\x01`).
pub const CTCP_DELIM: char = '\x01';

/// Known CTCP command types.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CtcpKind {
    /// ACTION - describes an action performed by the user.
    Action,
    /// VERSION - requests client version information.
    Version,
    /// PING - measures round-trip latency.
    Ping,
    /// TIME - requests local time from the client.
    Time,
    /// CLIENTINFO - requests list of supported CTCP commands.
    Clientinfo,
    /// Unknown or custom CTCP command.
    Unknown(String),
}

impl CtcpKind {
    /// Parse a CTCP command name into a `CtcpKind`.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "ACTION" => Self::Action,
            "VERSION" => Self::Version,
            "PING" => Self::Ping,
            "TIME" => Self::Time,
            "CLIENTINFO" => Self::Clientinfo,
            _ => Self::Unknown(name.to_owned()),
        }
    }

    /// Returns the canonical uppercase name of this CTCP command.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Action => "ACTION",
            Self::Version => "VERSION",
            Self::Ping => "PING",
            Self::Time => "TIME",
            Self::Clientinfo => "CLIENTINFO",
            Self::Unknown(s) => s,
        }
    }
}

impl fmt::Display for CtcpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether `text` is a CTCP frame.
///
/// The text must start and end with `\x01` and be longer than three
/// characters, so `"\x01\x01"` and `"\x01A\x01"` are plain text.
#[inline]
pub fn is_ctcp_frame(text: &str) -> bool {
    text.starts_with(CTCP_DELIM) && text.ends_with(CTCP_DELIM) && text.chars().count() > 3
}

/// Wrap `text` in CTCP delimiters.
pub fn frame(text: &str) -> String {
    format!("{}{}{}", CTCP_DELIM, text, CTCP_DELIM)
}

/// A CTCP frame found in message text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CtcpFrame<'a> {
    /// Upper-cased command token.
    pub command: String,
    /// Everything after the first space; empty if there was none.
    pub text: &'a str,
}

impl<'a> CtcpFrame<'a> {
    /// Parse a PRIVMSG/NOTICE body, returning `None` if it is not a frame.
    pub fn parse(text: &'a str) -> Option<Self> {
        if !is_ctcp_frame(text) {
            return None;
        }
        let inner = &text[CTCP_DELIM.len_utf8()..text.len() - CTCP_DELIM.len_utf8()];
        let (command, text) = inner.split_once(' ').unwrap_or((inner, ""));

        Some(Self {
            command: command.to_ascii_uppercase(),
            text,
        })
    }

    /// The command as a [`CtcpKind`].
    pub fn kind(&self) -> CtcpKind {
        CtcpKind::parse(&self.command)
    }
}

impl fmt::Display for CtcpFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CTCP_DELIM, self.command)?;
        if !self.text.is_empty() {
            write!(f, " {}", self.text)?;
        }
        write!(f, "{}", CTCP_DELIM)
    }
}
