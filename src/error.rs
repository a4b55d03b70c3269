//! Error types for the IRC client engine.
//!
//! Protocol-level failures (framing, tokenizing, outbound sanitizing) live in
//! [`ProtocolError`] and [`MessageParseError`]. Failures that belong to the
//! client surface (configuration, builder arguments, aborted subscribers)
//! live in [`ClientError`].

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Top-level protocol errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A buffered line grew past the configured limit.
    #[error("message too long: {actual} bytes (limit {limit})")]
    MessageTooLong {
        /// Bytes held when the limit was hit.
        actual: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// Illegal control character in an outbound argument.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),

    /// Failed to parse an IRC message.
    #[error("invalid message: {string}")]
    InvalidMessage {
        /// The raw message string.
        string: String,
        /// The underlying parse error.
        #[source]
        cause: MessageParseError,
    },
}

/// Errors encountered when tokenizing IRC lines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line contained no tokens.
    #[error("empty message")]
    EmptyMessage,

    /// Command token was missing or matched neither letters nor a 3-digit numeric.
    #[error("invalid command: {0:?}")]
    InvalidCommand(String),

    /// Prefix did not match `name[!user][@host][$server]`.
    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),
}

/// Errors raised by the client engine and its subscribers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Construction-time configuration was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An outbound builder was called with an argument that violates its contract.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Parameter name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Protocol failure (framing overflow, illegal characters, I/O).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A subscriber aborted delivery.
    #[error("handler failed: {0}")]
    Handler(String),

    /// The transport rejected an outbound line.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Protocol(ProtocolError::Io(err))
    }
}
