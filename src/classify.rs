//! Command classification.
//!
//! Maps a [`ParsedLine`] to the [`Event`] it publishes, plus the context
//! fields that are visible to subscribers while that event is delivered.
//! Missing positional parameters read as empty text.

use crate::ctcp::{CtcpFrame, CtcpKind};
use crate::event::Event;
use crate::message::ParsedLine;

/// Channel name sigils, including the IRCX `%`.
const CHANNEL_SIGILS: &[char] = &['#', '&', '+', '!', '%'];

/// Whether `name` looks like a channel.
pub fn is_channel(name: &str) -> bool {
    name.starts_with(CHANNEL_SIGILS)
}

/// The outcome of classifying one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classified {
    /// Event to publish.
    pub event: Event,
    /// Target of the event, for commands that have one.
    pub target: Option<String>,
    /// Channel the event concerns.
    pub channel: Option<String>,
    /// Numeric code of a numeric reply.
    pub numeric: Option<u16>,
}

impl Classified {
    fn plain(event: Event) -> Self {
        Self {
            event,
            target: None,
            channel: None,
            numeric: None,
        }
    }

    fn targeted(event: Event, target: Option<String>) -> Self {
        let channel = target.as_deref().filter(|t| is_channel(t)).map(str::to_owned);
        Self {
            event,
            target,
            channel,
            numeric: None,
        }
    }
}

/// Classify a tokenized line.
pub fn classify(line: &ParsedLine) -> Classified {
    let param = |i: usize| line.param(i).map(str::to_owned);
    let text = |i: usize| line.param(i).unwrap_or_default().to_owned();

    match line.command.as_str() {
        // JOIN [special] <channel>
        "JOIN" => {
            let (special, channel) = if line.params.len() > 1 {
                (param(0), param(1))
            } else {
                (None, param(0))
            };
            Classified::targeted(Event::Join { special }, channel)
        }
        // AUTH <name> <seq> [:<parameter>]
        "AUTH" => Classified::plain(Event::Auth {
            seq: param(1),
            parameter: param(2),
        }),
        command @ ("PRIVMSG" | "NOTICE") => {
            let body = line.param(1).unwrap_or_default();
            let event = match CtcpFrame::parse(body) {
                Some(frame) => ctcp_event(command == "PRIVMSG", frame),
                None if command == "PRIVMSG" => Event::Privmsg(body.to_owned()),
                None => Event::Notice(body.to_owned()),
            };
            Classified::targeted(event, param(0))
        }
        "ERROR" => Classified::plain(Event::Error(text(0))),
        "NICK" => Classified::plain(Event::Nick(text(0))),
        "PING" => Classified::plain(Event::Ping(text(0))),
        "QUIT" => Classified::plain(Event::Quit(text(0))),
        "WALLOPS" => Classified::plain(Event::Wallops(text(0))),
        // INVITE <nickname> <channel>
        "INVITE" => Classified::targeted(Event::Invite(text(1)), param(0)),
        // TOPIC <channel> :<topic>
        "TOPIC" => Classified::targeted(Event::Topic(text(1)), param(0)),
        // PROP <target> <property> :<data>
        "PROP" => Classified::targeted(
            Event::Prop {
                property: text(1),
                data: text(2),
            },
            param(0),
        ),
        // KICK <channel> <user> [:<comment>]
        "KICK" => Classified {
            channel: param(0),
            ..Classified::targeted(
                Event::Kick {
                    channel: text(0),
                    text: param(2),
                },
                param(1),
            )
        },
        // WHISPER <channel> <nickname> :<message>
        "WHISPER" => Classified {
            channel: param(0),
            ..Classified::targeted(
                Event::Whisper {
                    channel: text(0),
                    text: text(2),
                },
                param(1),
            )
        },
        command => match line.numeric() {
            Some(code) => Classified {
                numeric: Some(code),
                ..Classified::targeted(
                    Event::Numeric {
                        code,
                        line: line.clone(),
                    },
                    param(0),
                )
            },
            None => Classified::plain(Event::Raw {
                command: command.to_owned(),
                line: line.clone(),
            }),
        },
    }
}

fn ctcp_event(request: bool, frame: CtcpFrame<'_>) -> Event {
    let text = frame.text.to_owned();
    match frame.kind() {
        CtcpKind::Action => Event::Action(text),
        _ if request => Event::Ctcp {
            command: frame.command,
            text,
        },
        _ => Event::CtcpReply {
            command: frame.command,
            text,
        },
    }
}
