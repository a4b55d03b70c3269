//! Events published by the client.
//!
//! Every event a subscriber can bind to is a variant of [`Event`]; the
//! registry keys subscriptions by [`EventKind`]. Numeric replies and
//! commands without a dedicated variant are keyed by their code or command
//! name.

use std::fmt;

use crate::message::ParsedLine;

/// An event delivered to subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Event {
    /// The client was built.
    Start,
    /// The transport opened; registration has been sent.
    Connect,
    /// A raw chunk from the transport, before line framing.
    Data(String),
    /// One complete line.
    Line(String),
    /// A line with no valid command token.
    ParseError(String),
    /// A tokenized line, before classification.
    ParsedLine(ParsedLine),
    /// `JOIN [special] <channel>`; the channel is the context target.
    Join {
        /// IRCX leading parameter, if present.
        special: Option<String>,
    },
    /// `AUTH <name> <seq> [:<parameter>]`
    Auth {
        /// Sequence token.
        seq: Option<String>,
        /// Mechanism payload.
        parameter: Option<String>,
    },
    /// PRIVMSG text that is not a CTCP frame.
    Privmsg(String),
    /// NOTICE text that is not a CTCP frame.
    Notice(String),
    /// CTCP request carried by a PRIVMSG.
    Ctcp {
        /// Upper-cased CTCP command.
        command: String,
        /// Argument text.
        text: String,
    },
    /// CTCP reply carried by a NOTICE.
    CtcpReply {
        /// Upper-cased CTCP command.
        command: String,
        /// Argument text.
        text: String,
    },
    /// CTCP ACTION (`/me`).
    Action(String),
    /// Server `ERROR`.
    Error(String),
    /// Nickname change; the new nick.
    Nick(String),
    /// Server PING.
    Ping(String),
    /// QUIT with its message.
    Quit(String),
    /// WALLOPS text.
    Wallops(String),
    /// INVITE; the channel invited to.
    Invite(String),
    /// TOPIC; the new topic.
    Topic(String),
    /// IRCX `PROP <target> <property> :<data>`.
    Prop {
        /// Property name.
        property: String,
        /// Property value.
        data: String,
    },
    /// `KICK <channel> <user> [:<comment>]`; the user is the context target.
    Kick {
        /// Channel kicked from.
        channel: String,
        /// Kick comment.
        text: Option<String>,
    },
    /// IRCX `WHISPER <channel> <nick> :<message>`.
    Whisper {
        /// Channel the whisper was sent in.
        channel: String,
        /// Message text.
        text: String,
    },
    /// A three-digit numeric reply.
    Numeric {
        /// Reply code.
        code: u16,
        /// The full line.
        line: ParsedLine,
    },
    /// Any command without a dedicated variant.
    Raw {
        /// Upper-cased command name.
        command: String,
        /// The full line.
        line: ParsedLine,
    },
    /// The transport reported an error.
    TransportError(String),
    /// The transport closed.
    Disconnect,
}

/// Subscription key for an [`Event`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EventKind {
    Start,
    Connect,
    Data,
    Line,
    ParseError,
    ParsedLine,
    Join,
    Auth,
    Privmsg,
    Notice,
    Ctcp,
    CtcpReply,
    Action,
    Error,
    Nick,
    Ping,
    Quit,
    Wallops,
    Invite,
    Topic,
    Prop,
    Kick,
    Whisper,
    /// A specific numeric reply.
    Numeric(u16),
    /// A specific unclassified command, upper-cased.
    Raw(String),
    TransportError,
    Disconnect,
}

impl EventKind {
    /// Key for an unclassified command; the name is upper-cased.
    pub fn raw(command: &str) -> Self {
        EventKind::Raw(command.to_ascii_uppercase())
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Start => "start",
            EventKind::Connect => "connect",
            EventKind::Data => "data",
            EventKind::Line => "line",
            EventKind::ParseError => "parseError",
            EventKind::ParsedLine => "parsedLine",
            EventKind::Join => "JOIN",
            EventKind::Auth => "AUTH",
            EventKind::Privmsg => "PRIVMSG",
            EventKind::Notice => "NOTICE",
            EventKind::Ctcp => "CTCP",
            EventKind::CtcpReply => "CTCPREPLY",
            EventKind::Action => "ACTION",
            EventKind::Error => "ERROR",
            EventKind::Nick => "NICK",
            EventKind::Ping => "PING",
            EventKind::Quit => "QUIT",
            EventKind::Wallops => "WALLOPS",
            EventKind::Invite => "INVITE",
            EventKind::Topic => "TOPIC",
            EventKind::Prop => "PROP",
            EventKind::Kick => "KICK",
            EventKind::Whisper => "WHISPER",
            EventKind::Numeric(code) => return write!(f, "raw {:03}", code),
            EventKind::Raw(command) => return write!(f, "raw {}", command),
            EventKind::TransportError => "error",
            EventKind::Disconnect => "disconnect",
        };
        f.write_str(name)
    }
}

impl Event {
    /// The subscription key this event is delivered under.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Start => EventKind::Start,
            Event::Connect => EventKind::Connect,
            Event::Data(_) => EventKind::Data,
            Event::Line(_) => EventKind::Line,
            Event::ParseError(_) => EventKind::ParseError,
            Event::ParsedLine(_) => EventKind::ParsedLine,
            Event::Join { .. } => EventKind::Join,
            Event::Auth { .. } => EventKind::Auth,
            Event::Privmsg(_) => EventKind::Privmsg,
            Event::Notice(_) => EventKind::Notice,
            Event::Ctcp { .. } => EventKind::Ctcp,
            Event::CtcpReply { .. } => EventKind::CtcpReply,
            Event::Action(_) => EventKind::Action,
            Event::Error(_) => EventKind::Error,
            Event::Nick(_) => EventKind::Nick,
            Event::Ping(_) => EventKind::Ping,
            Event::Quit(_) => EventKind::Quit,
            Event::Wallops(_) => EventKind::Wallops,
            Event::Invite(_) => EventKind::Invite,
            Event::Topic(_) => EventKind::Topic,
            Event::Prop { .. } => EventKind::Prop,
            Event::Kick { .. } => EventKind::Kick,
            Event::Whisper { .. } => EventKind::Whisper,
            Event::Numeric { code, .. } => EventKind::Numeric(*code),
            Event::Raw { command, .. } => EventKind::Raw(command.clone()),
            Event::TransportError(_) => EventKind::TransportError,
            Event::Disconnect => EventKind::Disconnect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(EventKind::Numeric(1).to_string(), "raw 001");
        assert_eq!(EventKind::Numeric(433).to_string(), "raw 433");
        assert_eq!(EventKind::raw("mode").to_string(), "raw MODE");
        assert_eq!(EventKind::CtcpReply.to_string(), "CTCPREPLY");
        assert_eq!(EventKind::TransportError.to_string(), "error");
        assert_eq!(EventKind::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_event_kind() {
        let line: ParsedLine = ":srv 376 me :End of MOTD".parse().unwrap();
        let event = Event::Numeric {
            code: 376,
            line: line.clone(),
        };
        assert_eq!(event.kind(), EventKind::Numeric(376));

        let event = Event::Raw {
            command: "MODE".to_owned(),
            line,
        };
        assert_eq!(event.kind(), EventKind::raw("MODE"));
        assert_eq!(Event::Ping("x".to_owned()).kind(), EventKind::Ping);
    }
}
