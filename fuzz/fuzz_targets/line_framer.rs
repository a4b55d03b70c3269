//! Fuzz target for the line framer and the full client pipeline
//!
//! Input bytes are split into chunks at NUL bytes and fed one by one.

#![no_main]

use libfuzzer_sys::fuzz_target;
use slirc_client::{Client, ClientConfig, LineFramer, Outbox};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);

    let mut framer = LineFramer::with_max_len(512);
    for chunk in text.split('\0') {
        let framed = framer.feed(chunk);
        let clean = |l: &String| !l.is_empty() && !l.contains(|c: char| c == '\r' || c == '\n');
        assert!(framed.lines.iter().all(clean));
        assert!(framer.pending().len() <= 512);
    }

    let Ok(mut client) = Client::new(ClientConfig::default(), Outbox::new()) else {
        return;
    };
    for chunk in text.split('\0') {
        let _ = client.receive(chunk);
    }
    assert!(client.context().is_empty());
});
