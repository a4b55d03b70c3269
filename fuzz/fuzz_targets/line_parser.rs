//! Fuzz target for line tokenizing and classification
//!
//! Any UTF-8 input must either parse or fail with an error, never panic,
//! and a parsed line must classify.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::classify::classify;
use slirc_client::{ctcp::CtcpFrame, ParsedLine, Prefix};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    if input.len() > 8191 {
        return;
    }

    if let Ok(line) = ParsedLine::parse(input, Some("irc.example.net")) {
        let _ = classify(&line);
    }
    let _ = Prefix::parse(input);
    let _ = CtcpFrame::parse(input);
});
