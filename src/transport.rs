//! Egress contract.
//!
//! The client hands every outbound line to a [`Transport`] without a
//! terminator. What happens next (queueing, CRLF framing, writing to a
//! socket) is up to the implementation. [`Outbox`] is the queueing
//! implementation used by the async driver and by tests.

use std::collections::VecDeque;

use crate::error::ClientError;

/// Sink for outbound protocol lines.
pub trait Transport {
    /// Send one formatted line. The terminator is appended by the transport.
    fn send_line(&mut self, line: &str) -> Result<(), ClientError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send_line(&mut self, line: &str) -> Result<(), ClientError> {
        (**self).send_line(line)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send_line(&mut self, line: &str) -> Result<(), ClientError> {
        (**self).send_line(line)
    }
}

/// A transport that queues lines until they are drained.
#[derive(Clone, Debug, Default)]
pub struct Outbox {
    queue: VecDeque<String>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued line, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = String> + '_ {
        self.queue.drain(..)
    }

    /// Oldest queued line.
    pub fn pop(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Transport for Outbox {
    fn send_line(&mut self, line: &str) -> Result<(), ClientError> {
        self.queue.push_back(line.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbox_keeps_order() {
        let mut outbox = Outbox::new();
        outbox.send_line("NICK a").unwrap();
        outbox.send_line("USER a - - :a").unwrap();
        assert_eq!(outbox.len(), 2);

        let lines: Vec<_> = outbox.drain().collect();
        assert_eq!(lines, vec!["NICK a", "USER a - - :a"]);
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_boxed_transport() {
        let mut outbox = Outbox::new();
        {
            let mut boxed: Box<dyn Transport + '_> = Box::new(&mut outbox);
            boxed.send_line("PONG :x").unwrap();
        }
        assert_eq!(outbox.pop().as_deref(), Some("PONG :x"));
    }
}
