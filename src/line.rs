//! Line reassembly.
//!
//! [`LineFramer`] turns an unframed stream of text chunks into complete IRC
//! lines. Both CR and LF terminate a line, so CRLF, bare LF and bare CR all
//! work, and empty lines are dropped. At most one incomplete line is held
//! between calls.
//!
//! With the `tokio` feature, [`LineCodec`] writes CRLF-terminated lines and
//! rejects outbound text that would break framing.

#[cfg(feature = "tokio")]
use bytes::BytesMut;
#[cfg(feature = "tokio")]
use tokio_util::codec::Encoder;
use tracing::warn;

use crate::error::{ProtocolError, Result};

/// Default limit for a buffered, unterminated line.
pub const MAX_IRC_LINE_LEN: usize = 8191;

/// Output of one [`LineFramer::feed`] call.
#[derive(Debug, Default)]
pub struct Framed {
    /// Lines completed by the chunk, in arrival order.
    pub lines: Vec<String>,
    /// Set when the unterminated remainder went over the limit and was dropped.
    pub overflow: Option<ProtocolError>,
}

/// Accumulates stream fragments and yields complete lines.
///
/// # Example
///
/// ```
/// use slirc_client::LineFramer;
///
/// let mut framer = LineFramer::new();
/// assert!(framer.feed("PING :irc.ex").lines.is_empty());
/// assert_eq!(framer.feed("ample.net\r\n").lines, vec!["PING :irc.example.net"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineFramer {
    pending: String,
    max_len: Option<usize>,
}

impl LineFramer {
    /// Create a framer with no limit on the pending line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a framer that rejects a pending line longer than `max_len` bytes.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            pending: String::new(),
            max_len: Some(max_len),
        }
    }

    /// Feed a chunk, returning every line it completes.
    ///
    /// If the unterminated remainder exceeds the limit it is discarded and
    /// [`ProtocolError::MessageTooLong`] is reported in
    /// [`Framed::overflow`]. Lines completed by the same chunk are kept.
    pub fn feed(&mut self, chunk: &str) -> Framed {
        self.pending.push_str(chunk);

        let mut lines = Vec::new();
        let mut rest = self.pending.as_str();
        while let Some(pos) = rest.find(|c: char| c == '\r' || c == '\n') {
            let line = &rest[..pos];
            if !line.is_empty() {
                lines.push(line.to_owned());
            }
            rest = &rest[pos + 1..];
        }
        self.pending = rest.to_owned();

        let overflow = match self.max_len {
            Some(limit) if self.pending.len() > limit => {
                let actual = self.pending.len();
                warn!(actual, limit, "discarding oversized partial line");
                self.pending.clear();
                Some(ProtocolError::MessageTooLong { actual, limit })
            }
            _ => None,
        };

        Framed { lines, overflow }
    }

    /// The incomplete trailing data held for the next chunk.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Drop any incomplete trailing data.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Tokio encoder writing CRLF-terminated lines.
#[cfg(feature = "tokio")]
#[derive(Clone, Copy, Debug, Default)]
pub struct LineCodec;

#[cfg(feature = "tokio")]
impl LineCodec {
    /// Reject outbound data that would break framing.
    pub fn sanitize(line: &str) -> Result<&str> {
        match line.chars().find(|c| matches!(c, '\r' | '\n' | '\0')) {
            Some(ch) => Err(ProtocolError::IllegalControlChar(ch)),
            None => Ok(line),
        }
    }
}

/// Split `bytes` into the longest valid UTF-8 prefix and an incomplete tail.
///
/// Invalid sequences in the middle of the input are replaced with U+FFFD.
#[cfg(any(feature = "tokio", test))]
pub(crate) fn decode_utf8_prefix(bytes: &[u8]) -> (String, &[u8]) {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(s) => {
                out.push_str(s);
                return (out, &[]);
            }
            Err(e) => {
                let valid = e.valid_up_to();
                // valid_up_to marks a char boundary, so this cannot fail
                out.push_str(std::str::from_utf8(&rest[..valid]).unwrap_or_default());
                match e.error_len() {
                    Some(len) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        rest = &rest[valid + len..];
                    }
                    None => return (out, &rest[valid..]),
                }
            }
        }
    }
}

#[cfg(feature = "tokio")]
impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        let line = Self::sanitize(&line)?;
        dst.reserve(line.len() + 2);
        dst.extend_from_slice(line.as_bytes());
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_line_is_held() {
        let mut framer = LineFramer::new();
        assert!(framer.feed("PRIVMSG #chan :hel").lines.is_empty());
        assert_eq!(framer.pending(), "PRIVMSG #chan :hel");

        let framed = framer.feed("lo\r\n");
        assert_eq!(framed.lines, vec!["PRIVMSG #chan :hello"]);
        assert!(framed.overflow.is_none());
        assert_eq!(framer.pending(), "");
    }

    #[test]
    fn test_crlf_does_not_yield_empty_line() {
        let mut framer = LineFramer::new();
        let lines = framer.feed("A\r\nB\r\n\r\n\nC\rD").lines;
        assert_eq!(lines, vec!["A", "B", "C"]);
        assert_eq!(framer.pending(), "D");
    }

    #[test]
    fn test_cr_and_lf_split_across_chunks() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.feed("PING :x\r").lines, vec!["PING :x"]);
        assert!(framer.feed("\n").lines.is_empty());
        assert_eq!(framer.pending(), "");
    }

    #[test]
    fn test_limit_discards_pending() {
        let mut framer = LineFramer::with_max_len(8);
        assert!(framer.feed("12345678").overflow.is_none());

        let framed = framer.feed("9");
        assert!(framed.lines.is_empty());
        assert!(matches!(
            framed.overflow,
            Some(ProtocolError::MessageTooLong {
                actual: 9,
                limit: 8
            })
        ));
        assert_eq!(framer.pending(), "");

        // Long but terminated lines are not held, so they pass.
        let framed = framer.feed("0123456789\n");
        assert_eq!(framed.lines, vec!["0123456789"]);
        assert!(framed.overflow.is_none());
    }

    #[test]
    fn test_overflow_keeps_completed_lines() {
        let mut framer = LineFramer::with_max_len(16);
        let framed = framer.feed("PING :k\r\nPRIVMSG #x :this partial is too long");
        assert_eq!(framed.lines, vec!["PING :k"]);
        assert!(matches!(
            framed.overflow,
            Some(ProtocolError::MessageTooLong { limit: 16, .. })
        ));
        assert_eq!(framer.pending(), "");
    }

    #[test]
    fn test_clear() {
        let mut framer = LineFramer::new();
        framer.feed("partial");
        framer.clear();
        assert_eq!(framer.feed(" line\n").lines, vec![" line"]);
    }

    #[test]
    fn test_decode_utf8_prefix_keeps_split_sequence() {
        let bytes = "héllo".as_bytes();
        let (text, tail) = decode_utf8_prefix(&bytes[..2]);
        assert_eq!(text, "h");
        assert_eq!(tail, &bytes[1..2]);

        let (text, tail) = decode_utf8_prefix(b"a\xffb");
        assert_eq!(text, "a\u{fffd}b");
        assert!(tail.is_empty());
    }

    #[cfg(feature = "tokio")]
    #[test]
    fn test_codec_encode_appends_crlf() {
        let mut out = BytesMut::new();
        LineCodec.encode("PONG :c".to_string(), &mut out).unwrap();
        assert_eq!(&out[..], b"PONG :c\r\n");
    }

    #[cfg(feature = "tokio")]
    #[test]
    fn test_codec_rejects_embedded_newline() {
        let mut out = BytesMut::new();
        let err = LineCodec
            .encode("PRIVMSG #a :x\r\nQUIT".to_string(), &mut out)
            .unwrap_err();
        assert!(matches!(err, ProtocolError::IllegalControlChar('\r')));
        assert!(out.is_empty());
    }
}
