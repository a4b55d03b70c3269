//! Session state and client configuration.
//!
//! [`ClientConfig`] is what the caller supplies at construction;
//! [`Session`] is the connection-wide record the engine keeps up to date.
//! The nickname and server name in a session are placeholders until the
//! server's welcome numeric (001) has been classified.

use crate::error::ClientError;
use crate::line::MAX_IRC_LINE_LEN;

/// Current state of the connection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionState {
    /// Not connected.
    #[default]
    Disconnected,
    /// Transport is open and USER/NICK were sent; awaiting 001.
    Registering,
    /// Received 001.
    Connected,
}

/// Configuration for a client.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientConfig {
    /// Server to connect to.
    pub hostname: String,
    /// Server port.
    pub port: u16,
    /// Whether TLS should be used.
    pub use_tls: bool,
    /// Desired nickname; a random `Guest_` nick is used when absent.
    pub nickname: Option<String>,
    /// Username (ident).
    pub user_name: String,
    /// Real name / GECOS.
    pub real_name: String,
    /// Text sent in reply to a CTCP VERSION request.
    pub version_reply: String,
    /// Limit for a buffered, unterminated line; `None` disables it.
    pub max_line_len: Option<usize>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            hostname: "irc.irc7.com".to_owned(),
            port: 6667,
            use_tls: false,
            nickname: None,
            user_name: "IRCSock".to_owned(),
            real_name: concat!("slirc-client v", env!("CARGO_PKG_VERSION")).to_owned(),
            version_reply: concat!("slirc-client ", env!("CARGO_PKG_VERSION")).to_owned(),
            max_line_len: Some(MAX_IRC_LINE_LEN),
        }
    }
}

impl ClientConfig {
    /// Config for `hostname:port` with every other field defaulted.
    pub fn new(hostname: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            port,
            ..Self::default()
        }
    }

    /// Check the configuration before a client is built from it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] for an empty hostname, port 0,
    /// an empty or whitespace-bearing user name or nickname, or a limit of 0.
    pub fn validate(&self) -> Result<(), ClientError> {
        let invalid = |msg: &str| -> Result<(), ClientError> {
            Err(ClientError::InvalidConfig(msg.to_owned()))
        };

        if self.hostname.trim().is_empty() {
            return invalid("hostname must not be empty");
        }
        if self.port == 0 {
            return invalid("port must not be 0");
        }
        if !is_word(&self.user_name) {
            return invalid("user_name must be a single non-empty word");
        }
        if let Some(nick) = &self.nickname {
            if !is_word(nick) {
                return invalid("nickname must be a single non-empty word");
            }
        }
        if self.max_line_len == Some(0) {
            return invalid("max_line_len must be positive");
        }
        Ok(())
    }
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && !s.starts_with(':') && !s.chars().any(|c| c.is_whitespace() || c == '\0')
}

/// A random `Guest_<hex>` nickname.
pub fn guest_nickname() -> String {
    let mut bytes = [0u8; 4];
    let value = match getrandom::getrandom(&mut bytes) {
        Ok(()) => u32::from_le_bytes(bytes),
        // Sub-second clock bits are good enough for a placeholder nick.
        Err(_) => chrono::Utc::now().timestamp_subsec_nanos(),
    };
    format!("Guest_{:x}", value.max(1))
}

/// Connection-wide session record.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Session {
    /// Marked away.
    pub away: bool,
    /// Current nickname.
    pub nickname: String,
    /// Configured port.
    pub port: u16,
    /// Real name sent at registration.
    pub real_name: String,
    /// Name of the server that welcomed us; `None` before registration.
    pub server: Option<String>,
    /// Host the client was asked to connect to.
    pub server_target: String,
    /// TLS was requested.
    pub tls: bool,
    /// Username sent at registration.
    pub user_name: String,
    /// Connection state.
    pub state: ConnectionState,
}

impl Session {
    /// Build the initial session from a config.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            away: false,
            nickname: config.nickname.clone().unwrap_or_else(guest_nickname),
            port: config.port,
            real_name: config.real_name.clone(),
            server: None,
            server_target: config.hostname.clone(),
            tls: config.use_tls,
            user_name: config.user_name.clone(),
            state: ConnectionState::Disconnected,
        }
    }

    /// Whether the server has welcomed us.
    pub fn is_registered(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}
