//! Outbound command builders.
//!
//! Each builder renders exactly one protocol line without a terminator;
//! appending CRLF is the transport's job. Arguments are checked so a
//! rendered line can never smuggle a second command onto the wire.
//!
//! # Example
//!
//! ```
//! use slirc_client::encode;
//!
//! assert_eq!(encode::privmsg("#rust", "hi all").unwrap(), "PRIVMSG #rust :hi all");
//! assert_eq!(encode::describe("#rust", "waves").unwrap(), "PRIVMSG #rust :\x01ACTION waves\x01");
//! assert!(encode::privmsg("#rust", "two\r\nlines").is_err());
//! ```

use crate::ctcp;
use crate::error::{ClientError, ProtocolError};

/// Reject text that contains a line terminator or NUL.
fn check_text(text: &str) -> Result<(), ClientError> {
    match text.chars().find(|c| matches!(c, '\r' | '\n' | '\0')) {
        Some(ch) => Err(ProtocolError::IllegalControlChar(ch).into()),
        None => Ok(()),
    }
}

/// Reject a middle parameter that is empty, starts with `:` or holds whitespace.
fn check_word(name: &'static str, word: &str) -> Result<(), ClientError> {
    let reason = if word.is_empty() {
        "must not be empty"
    } else if word.starts_with(':') {
        "must not start with ':'"
    } else if word.chars().any(char::is_whitespace) {
        "must not contain whitespace"
    } else {
        return check_text(word);
    };
    Err(ClientError::InvalidArgument {
        name,
        reason: reason.to_owned(),
    })
}

/// `PRIVMSG <target> :<text>`
pub fn privmsg(target: &str, text: &str) -> Result<String, ClientError> {
    check_word("target", target)?;
    check_text(text)?;
    Ok(format!("PRIVMSG {} :{}", target, text))
}

/// `NOTICE <target> :<text>`
pub fn notice(target: &str, text: &str) -> Result<String, ClientError> {
    check_word("target", target)?;
    check_text(text)?;
    Ok(format!("NOTICE {} :{}", target, text))
}

/// A CTCP request: `PRIVMSG <target> :\x01<text>\x01`
pub fn ctcp(target: &str, text: &str) -> Result<String, ClientError> {
    privmsg(target, &ctcp::frame(text))
}

/// A CTCP reply: `NOTICE <target> :\x01<text>\x01`
pub fn ctcp_reply(target: &str, text: &str) -> Result<String, ClientError> {
    notice(target, &ctcp::frame(text))
}

/// A CTCP ACTION (`/me`).
pub fn describe(target: &str, text: &str) -> Result<String, ClientError> {
    ctcp(target, &format!("ACTION {}", text))
}

/// `USER <user_name> - - :<real_name>`
pub fn user(user_name: &str, real_name: &str) -> Result<String, ClientError> {
    check_word("user_name", user_name)?;
    check_text(real_name)?;
    Ok(format!("USER {} - - :{}", user_name, real_name))
}

/// `NICK <nickname>`
pub fn nick(nickname: &str) -> Result<String, ClientError> {
    check_word("nickname", nickname)?;
    Ok(format!("NICK {}", nickname))
}

/// `PONG :<text>`
pub fn pong(text: &str) -> Result<String, ClientError> {
    check_text(text)?;
    Ok(format!("PONG :{}", text))
}
