//! # slirc-client
//!
//! An event-driven IRC client engine.
//!
//! The engine takes the raw, arbitrarily fragmented text a transport
//! receives, reassembles protocol lines, tokenizes them, classifies each by
//! command and publishes a typed [`Event`] with the derived fields
//! (target, sender identity, CTCP sub-command) a subscriber needs. The
//! reverse direction renders PRIVMSG, NOTICE, CTCP, USER, NICK and PONG
//! lines for a [`Transport`].
//!
//! ## Features
//!
//! - Line reassembly with a bounded partial-line buffer
//! - `nom`-based line and prefix grammar, IRCv3 tags kept raw
//! - CTCP detection (ACTION, PING, TIME, VERSION) with default replies
//! - Synchronous, re-entrant publish/subscribe with a scoped per-event
//!   context
//! - Optional Tokio TCP/TLS driver (`tokio` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use slirc_client::{Client, ClientConfig, EventKind, Outbox};
//!
//! let config = ClientConfig {
//!     nickname: Some("ferris".to_owned()),
//!     ..ClientConfig::default()
//! };
//! let mut client = Client::new(config, Outbox::new()).unwrap();
//! client.on(EventKind::Numeric(1), |client, _| {
//!     client.msg("NickServ", "IDENTIFY hunter2")
//! });
//!
//! client.connected().unwrap();
//! client.receive(":irc.example.net 001 ferris_ :Welc").unwrap();
//! client.receive("ome\r\nPING :irc.example.net\r\n").unwrap();
//!
//! assert_eq!(client.session().nickname, "ferris_");
//! assert_eq!(client.session().server.as_deref(), Some("irc.example.net"));
//!
//! let sent: Vec<_> = client.transport_mut().drain().collect();
//! assert_eq!(sent[1], "NICK ferris");
//! assert_eq!(sent[2], "PRIVMSG NickServ :IDENTIFY hunter2");
//! assert_eq!(sent[3], "PONG :irc.example.net");
//! ```

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod classify;
pub mod client;
#[cfg(feature = "tokio")]
#[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
pub mod connection;
pub mod context;
pub mod ctcp;
pub mod dispatch;
pub mod encode;
pub mod error;
pub mod event;
pub mod line;
pub mod message;
pub mod prefix;
pub mod state;
pub mod transport;

pub use self::client::{Client, ClientBuilder};
pub use self::context::EventContext;
pub use self::ctcp::{CtcpFrame, CtcpKind};
pub use self::dispatch::{HandlerId, Registry};
pub use self::error::{ClientError, MessageParseError, ProtocolError};
pub use self::event::{Event, EventKind};
#[cfg(feature = "tokio")]
pub use self::line::LineCodec;
pub use self::line::{Framed, LineFramer, MAX_IRC_LINE_LEN};
pub use self::message::{ParsedLine, Source};
pub use self::prefix::Prefix;
pub use self::state::{ClientConfig, ConnectionState, Session};
pub use self::transport::{Outbox, Transport};
