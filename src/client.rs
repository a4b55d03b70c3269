//! The event-driven client engine.
//!
//! A [`Client`] owns the session, the line framer, the subscriber registry
//! and a [`Transport`] for outbound lines. The transport owner feeds it raw
//! chunks with [`Client::receive`] and reports lifecycle changes with
//! [`Client::connected`], [`Client::errored`] and [`Client::disconnected`].
//!
//! The inbound pipeline is itself a chain of ordinary subscribers:
//!
//! ```text
//! Data --framer--> Line --tokenizer--> ParsedLine --classify--> JOIN, PRIVMSG, raw 001 ...
//! ```
//!
//! so any stage can be observed, removed or replaced. Delivery is
//! synchronous and re-entrant; a subscriber may send, emit or (un)subscribe
//! while it runs.
//!
//! # Example
//!
//! ```
//! use slirc_client::{Client, ClientConfig, Event, EventKind, Outbox};
//!
//! let config = ClientConfig {
//!     nickname: Some("ferris".to_owned()),
//!     ..ClientConfig::default()
//! };
//! let mut client = Client::new(config, Outbox::new()).unwrap();
//!
//! client.on(EventKind::Privmsg, |client, event| {
//!     if let Event::Privmsg(text) = event {
//!         if text == "!hello" {
//!             let target = client.context().target.clone().unwrap_or_default();
//!             client.msg(&target, "hello yourself")?;
//!         }
//!     }
//!     Ok(())
//! });
//!
//! client.receive(":bob!b@example.net PRIVMSG #rust :!hello\r\n").unwrap();
//! let sent: Vec<_> = client.transport_mut().drain().collect();
//! assert_eq!(sent, vec!["PRIVMSG #rust :hello yourself"]);
//! ```

use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, trace, warn};

use crate::classify::{classify, Classified};
use crate::context::{self, ContextStack, EventContext};
use crate::ctcp::CtcpKind;
use crate::dispatch::{Handler, HandlerId, Registry};
use crate::encode;
use crate::error::{ClientError, ProtocolError};
use crate::event::{Event, EventKind};
use crate::line::LineFramer;
use crate::message::{ParsedLine, Source};
use crate::state::{ClientConfig, ConnectionState, Session};
use crate::transport::Transport;

/// An IRC client engine bound to a transport.
pub struct Client<T: Transport> {
    config: ClientConfig,
    session: Session,
    framer: LineFramer,
    transport: T,
    registry: Registry<Client<T>>,
    contexts: ContextStack,
}

impl<T: Transport> AsMut<ContextStack> for Client<T> {
    fn as_mut(&mut self) -> &mut ContextStack {
        &mut self.contexts
    }
}

impl<T: Transport + fmt::Debug> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("session", &self.session)
            .field("framer", &self.framer)
            .field("transport", &self.transport)
            .field("registry", &self.registry)
            .field("contexts", &self.contexts)
            .finish()
    }
}

impl<T: Transport + 'static> Client<T> {
    /// Build a client with the default pipeline and emit [`Event::Start`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] if the config does not validate.
    pub fn new(config: ClientConfig, transport: T) -> Result<Self, ClientError> {
        ClientBuilder::new(config).build(transport)
    }

    /// Start building a client.
    pub fn builder(config: ClientConfig) -> ClientBuilder<T> {
        ClientBuilder::new(config)
    }

    /// Feed a raw chunk from the transport.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MessageTooLong`] (wrapped) when a partial
    /// line outgrows the configured limit, or the first error returned by a
    /// subscriber during delivery.
    pub fn receive(&mut self, chunk: &str) -> Result<(), ClientError> {
        self.emit(Event::Data(chunk.to_owned()))
    }

    /// The transport opened. Registration is sent by the default pipeline.
    pub fn connected(&mut self) -> Result<(), ClientError> {
        self.session.state = ConnectionState::Registering;
        self.emit(Event::Connect)
    }

    /// The transport reported an error.
    pub fn errored(&mut self, message: impl Into<String>) -> Result<(), ClientError> {
        let message = message.into();
        warn!(error = %message, "transport error");
        self.emit(Event::TransportError(message))
    }

    /// The transport closed.
    pub fn disconnected(&mut self) -> Result<(), ClientError> {
        self.emit(Event::Disconnect)
    }

    /// Deliver `event` to its subscribers, in registration order.
    ///
    /// The context's `event` field names `event` for the duration of the
    /// delivery. The first subscriber error stops delivery and is returned.
    pub fn emit(&mut self, event: Event) -> Result<(), ClientError> {
        let kind = event.kind();
        let handlers = self.registry.snapshot(&kind);
        if handlers.is_empty() {
            return Ok(());
        }

        let mut scope = context::enter(self, |ctx| ctx.event = Some(kind));
        for handler in handlers {
            handler(&mut *scope, &event)?;
        }
        Ok(())
    }

    /// Send one unterminated line through the transport.
    ///
    /// # Errors
    ///
    /// Fails with [`ProtocolError::IllegalControlChar`] if the line contains
    /// CR, LF or NUL, or with whatever the transport reports.
    pub fn send(&mut self, line: &str) -> Result<(), ClientError> {
        if let Some(ch) = line.chars().find(|c| matches!(c, '\r' | '\n' | '\0')) {
            return Err(ProtocolError::IllegalControlChar(ch).into());
        }
        debug!("--> {}", line);
        self.transport.send_line(line)
    }

    /// `PRIVMSG <target> :<text>`
    pub fn msg(&mut self, target: &str, text: &str) -> Result<(), ClientError> {
        let line = encode::privmsg(target, text)?;
        self.send(&line)
    }

    /// `NOTICE <target> :<text>`
    pub fn notice(&mut self, target: &str, text: &str) -> Result<(), ClientError> {
        let line = encode::notice(target, text)?;
        self.send(&line)
    }

    /// Send a CTCP request.
    pub fn ctcp(&mut self, target: &str, text: &str) -> Result<(), ClientError> {
        let line = encode::ctcp(target, text)?;
        self.send(&line)
    }

    /// Send a CTCP reply.
    pub fn ctcp_reply(&mut self, target: &str, text: &str) -> Result<(), ClientError> {
        let line = encode::ctcp_reply(target, text)?;
        self.send(&line)
    }

    /// Send a CTCP ACTION.
    pub fn describe(&mut self, target: &str, text: &str) -> Result<(), ClientError> {
        let line = encode::describe(target, text)?;
        self.send(&line)
    }

    /// Subscribe to every delivery of `kind`.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&mut Self, &Event) -> Result<(), ClientError> + 'static,
    {
        self.registry.on(kind, handler)
    }

    /// Subscribe to the next delivery of `kind`.
    pub fn once<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&mut Self, &Event) -> Result<(), ClientError> + 'static,
    {
        self.registry.once(kind, handler)
    }

    /// Remove a subscriber.
    pub fn off(&mut self, id: HandlerId) -> bool {
        self.registry.off(id)
    }

    /// Remove every subscriber of `kind`, the built-in stage included.
    pub fn clear_handlers(&mut self, kind: &EventKind) {
        self.registry.clear(kind);
    }

    /// Number of subscribers of `kind`.
    pub fn listener_count(&self, kind: &EventKind) -> usize {
        self.registry.listener_count(kind)
    }

    /// Context of the event being delivered; empty outside delivery.
    pub fn context(&self) -> &EventContext {
        self.contexts.current()
    }

    /// The live session record.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable access to the session record.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Partial line held for the next chunk.
    pub fn pending(&self) -> &str {
        self.framer.pending()
    }

    /// The outbound transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the outbound transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the client, returning its transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn install_defaults(&mut self) {
        self.on(EventKind::Connect, Self::register);
        self.on(EventKind::Data, Self::frame_data);
        self.on(EventKind::Line, Self::tokenize_line);
        self.on(EventKind::ParsedLine, Self::classify_line);
        self.on(EventKind::Numeric(1), Self::welcome);
        self.on(EventKind::Ping, Self::pong);
        self.on(EventKind::Ctcp, Self::ctcp_auto_reply);
        self.on(EventKind::Disconnect, Self::reset);
    }

    fn register(&mut self, _: &Event) -> Result<(), ClientError> {
        debug!(
            user = %self.session.user_name,
            nick = %self.session.nickname,
            "registering"
        );
        let user = encode::user(&self.session.user_name, &self.session.real_name)?;
        let nick = encode::nick(&self.session.nickname)?;
        self.send(&user)?;
        self.send(&nick)
    }

    fn frame_data(&mut self, event: &Event) -> Result<(), ClientError> {
        let Event::Data(chunk) = event else {
            return Ok(());
        };
        let framed = self.framer.feed(chunk);
        for line in framed.lines {
            self.emit(Event::Line(line))?;
        }
        match framed.overflow {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    fn tokenize_line(&mut self, event: &Event) -> Result<(), ClientError> {
        let Event::Line(line) = event else {
            return Ok(());
        };
        trace!("<-- {}", line);

        let parsed = match ParsedLine::parse(line, self.session.server.as_deref()) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(%line, "unparseable line: {}", err);
                return self.emit(Event::ParseError(line.clone()));
            }
        };
        if let Source::Malformed(prefix) = &parsed.prefix {
            warn!(%prefix, "malformed prefix");
        }

        let mut scope = context::enter(self, |ctx| {
            ctx.nick = None;
            ctx.site = None;
            ctx.address = None;
            ctx.full_address = None;
            if let Some(prefix) = parsed.prefix.prefix() {
                ctx.nick = Some(prefix.name.clone());
                ctx.site = prefix.host.clone();
                ctx.address = prefix.address();
                ctx.full_address = prefix.full_address();
            }
        });
        scope.emit(Event::ParsedLine(parsed))
    }

    fn classify_line(&mut self, event: &Event) -> Result<(), ClientError> {
        let Event::ParsedLine(line) = event else {
            return Ok(());
        };
        let Classified {
            event,
            target,
            channel,
            numeric,
        } = classify(line);

        let mut scope = context::enter(self, |ctx| {
            ctx.raw = Some(line.raw.clone());
            ctx.target = target;
            ctx.channel = channel;
            ctx.numeric = numeric;
        });
        scope.emit(event)
    }

    fn welcome(&mut self, event: &Event) -> Result<(), ClientError> {
        let Event::Numeric { line, .. } = event else {
            return Ok(());
        };
        let nick = self
            .context()
            .target
            .clone()
            .or_else(|| line.param(0).map(str::to_owned));
        if let Some(nick) = nick {
            self.session.nickname = nick;
        }
        self.session.server = line.prefix.name().map(str::to_owned);
        self.session.state = ConnectionState::Connected;

        info!(
            nick = %self.session.nickname,
            server = ?self.session.server,
            "registered"
        );
        Ok(())
    }

    fn pong(&mut self, event: &Event) -> Result<(), ClientError> {
        let Event::Ping(text) = event else {
            return Ok(());
        };
        let line = encode::pong(text)?;
        self.send(&line)
    }

    fn ctcp_auto_reply(&mut self, event: &Event) -> Result<(), ClientError> {
        let Event::Ctcp { command, text } = event else {
            return Ok(());
        };
        let Some(nick) = self.context().nick.clone() else {
            return Ok(());
        };

        let reply = match CtcpKind::parse(command) {
            CtcpKind::Ping if text.is_empty() => command.clone(),
            CtcpKind::Ping => format!("{} {}", command, text),
            CtcpKind::Time if text.is_empty() => {
                format!("{} {}", command, chrono::Local::now().to_rfc2822())
            }
            CtcpKind::Version if text.is_empty() => {
                format!("{} {}", command, self.config.version_reply)
            }
            _ => return Ok(()),
        };
        self.ctcp_reply(&nick, &reply)
    }

    fn reset(&mut self, _: &Event) -> Result<(), ClientError> {
        self.framer.clear();
        self.session.server = None;
        self.session.state = ConnectionState::Disconnected;
        debug!("session reset after disconnect");
        Ok(())
    }
}

/// Builds a [`Client`], letting subscribers see [`Event::Start`].
pub struct ClientBuilder<T: Transport> {
    config: ClientConfig,
    defaults: bool,
    handlers: Vec<(EventKind, Handler<Client<T>>)>,
}

impl<T: Transport + 'static> ClientBuilder<T> {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            defaults: true,
            handlers: Vec::new(),
        }
    }

    /// Subscribe before the client exists. Runs after the built-in stages.
    pub fn on<F>(mut self, kind: EventKind, handler: F) -> Self
    where
        F: Fn(&mut Client<T>, &Event) -> Result<(), ClientError> + 'static,
    {
        let handler: Handler<Client<T>> = Rc::new(handler);
        self.handlers.push((kind, handler));
        self
    }

    /// Leave out the built-in pipeline. Nothing is framed, parsed or
    /// answered unless the caller subscribes stages of its own.
    pub fn without_defaults(mut self) -> Self {
        self.defaults = false;
        self
    }

    /// Validate the config, create the client and emit [`Event::Start`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`], or an error returned by a
    /// `Start` subscriber.
    pub fn build(self, transport: T) -> Result<Client<T>, ClientError> {
        self.config.validate()?;

        let framer = match self.config.max_line_len {
            Some(limit) => LineFramer::with_max_len(limit),
            None => LineFramer::new(),
        };
        let mut client = Client {
            session: Session::new(&self.config),
            config: self.config,
            framer,
            transport,
            registry: Registry::new(),
            contexts: ContextStack::default(),
        };
        if self.defaults {
            client.install_defaults();
        }
        for (kind, handler) in self.handlers {
            client.registry.on_shared(kind, handler);
        }

        client.emit(Event::Start)?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::transport::Outbox;

    fn client() -> Client<Outbox> {
        let config = ClientConfig {
            nickname: Some("me".to_owned()),
            ..ClientConfig::default()
        };
        Client::new(config, Outbox::new()).unwrap()
    }

    fn sent(client: &mut Client<Outbox>) -> Vec<String> {
        client.transport_mut().drain().collect()
    }

    #[test]
    fn test_registration_on_connect() {
        let mut client = client();
        client.connected().unwrap();
        assert_eq!(
            sent(&mut client),
            vec![
                format!("USER IRCSock - - :{}", client.session().real_name),
                "NICK me".to_owned()
            ]
        );
        assert_eq!(client.session().state, ConnectionState::Registering);
    }

    #[test]
    fn test_start_seen_by_builder_subscriber() {
        let started = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&started);
        let client = Client::builder(ClientConfig::default())
            .on(EventKind::Start, move |_, _| {
                *seen.borrow_mut() += 1;
                Ok(())
            })
            .build(Outbox::new())
            .unwrap();
        assert_eq!(*started.borrow(), 1);
        assert!(client.context().is_empty());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let err = Client::new(ClientConfig::new("", 6667), Outbox::new()).unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
    }

    #[test]
    fn test_sender_context_during_delivery() {
        let seen = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&seen);
        let mut client = client();
        client.on(EventKind::Privmsg, move |client, _| {
            *slot.borrow_mut() = Some(client.context().clone());
            Ok(())
        });

        client
            .receive(":bob!bobby@example.net PRIVMSG #rust :hi\r\n")
            .unwrap();

        let ctx = seen.borrow().clone().unwrap();
        assert_eq!(ctx.nick.as_deref(), Some("bob"));
        assert_eq!(ctx.site.as_deref(), Some("example.net"));
        assert_eq!(ctx.address.as_deref(), Some("bobby@example.net"));
        assert_eq!(ctx.full_address.as_deref(), Some("bob!bobby@example.net"));
        assert_eq!(ctx.target.as_deref(), Some("#rust"));
        assert_eq!(ctx.channel.as_deref(), Some("#rust"));
        assert_eq!(ctx.event, Some(EventKind::Privmsg));
        assert_eq!(
            ctx.raw.as_deref(),
            Some(":bob!bobby@example.net PRIVMSG #rust :hi")
        );
        assert!(client.context().is_empty());
    }

    #[test]
    fn test_ctcp_auto_replies() {
        let mut client = client();
        client
            .receive(":bob!b@h PRIVMSG me :\x01PING 12345\x01\r\n")
            .unwrap();
        client.receive(":bob!b@h PRIVMSG me :\x01VERSION\x01\r\n").unwrap();
        client.receive(":bob!b@h PRIVMSG me :\x01FINGER\x01\r\n").unwrap();

        let version = client.config().version_reply.clone();
        assert_eq!(
            sent(&mut client),
            vec![
                "NOTICE bob :\x01PING 12345\x01".to_owned(),
                format!("NOTICE bob :\x01VERSION {}\x01", version),
            ]
        );

        client.receive(":bob!b@h PRIVMSG me :\x01TIME\x01\r\n").unwrap();
        let reply = sent(&mut client).pop().unwrap();
        assert!(reply.starts_with("NOTICE bob :\x01TIME "));
    }

    #[test]
    fn test_handler_error_aborts_delivery() {
        let mut client = client();
        client.on(EventKind::Ping, |_, _| Err(ClientError::Handler("stop".to_owned())));
        client.on(EventKind::Ping, |client, _| client.send("SHOULD NOT RUN"));

        let err = client.receive("PING :x\r\n").unwrap_err();
        assert!(matches!(err, ClientError::Handler(_)));
        assert_eq!(sent(&mut client), vec!["PONG :x"]);
        assert!(client.context().is_empty());
    }

    #[test]
    fn test_disconnect_resets_session() {
        let mut client = client();
        client.connected().unwrap();
        client
            .receive(":irc.example.net 001 me :Welcome\r\n:irc.example.net 37")
            .unwrap();
        assert_eq!(client.session().state, ConnectionState::Connected);
        assert_eq!(client.pending(), ":irc.example.net 37");

        client.disconnected().unwrap();
        assert_eq!(client.pending(), "");
        assert_eq!(client.session().server, None);
        assert_eq!(client.session().state, ConnectionState::Disconnected);
    }

    #[test]
    fn test_send_rejects_line_breaks() {
        let mut client = client();
        assert!(client.send("PRIVMSG a :b\r\nQUIT").is_err());
        assert!(client.transport().is_empty());
    }
}
