//! Subscriber registry.
//!
//! Subscribers are keyed by [`EventKind`] and run in registration order.
//! Delivery works from a snapshot of the list, so a subscriber may add or
//! remove subscribers, or trigger nested deliveries, without affecting the
//! delivery in progress.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ClientError;
use crate::event::{Event, EventKind};

/// A subscriber. `C` is the object handed to it, normally the client.
pub type Handler<C> = Rc<dyn Fn(&mut C, &Event) -> Result<(), ClientError>>;

/// Identifies a registered subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

struct Entry<C> {
    id: HandlerId,
    once: bool,
    handler: Handler<C>,
}

/// Subscribers by event kind.
pub struct Registry<C> {
    next_id: u64,
    entries: HashMap<EventKind, Vec<Entry<C>>>,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: HashMap::new(),
        }
    }
}

impl<C> std::fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self
            .entries
            .iter()
            .map(|(kind, list)| (kind.to_string(), list.len()))
            .collect();
        kinds.sort();
        f.debug_struct("Registry").field("entries", &kinds).finish()
    }
}

impl<C> Registry<C> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, kind: EventKind, handler: Handler<C>, once: bool) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.entries.entry(kind).or_default().push(Entry { id, once, handler });
        id
    }

    /// Subscribe to every delivery of `kind`.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&mut C, &Event) -> Result<(), ClientError> + 'static,
    {
        self.insert(kind, Rc::new(handler), false)
    }

    /// Subscribe to the next delivery of `kind` only.
    pub fn once<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&mut C, &Event) -> Result<(), ClientError> + 'static,
    {
        self.insert(kind, Rc::new(handler), true)
    }

    /// Subscribe an already shared handler.
    pub fn on_shared(&mut self, kind: EventKind, handler: Handler<C>) -> HandlerId {
        self.insert(kind, handler, false)
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn off(&mut self, id: HandlerId) -> bool {
        let mut removed = false;
        self.entries.retain(|_, list| {
            let before = list.len();
            list.retain(|entry| entry.id != id);
            removed |= list.len() != before;
            !list.is_empty()
        });
        removed
    }

    /// Remove every subscriber of `kind`, including the built-in ones.
    pub fn clear(&mut self, kind: &EventKind) {
        self.entries.remove(kind);
    }

    /// Number of subscribers of `kind`.
    pub fn listener_count(&self, kind: &EventKind) -> usize {
        self.entries.get(kind).map_or(0, Vec::len)
    }

    /// Handlers to run for one delivery of `kind`.
    ///
    /// One-shot subscribers are removed as they are handed out.
    pub(crate) fn snapshot(&mut self, kind: &EventKind) -> Vec<Handler<C>> {
        let Some(list) = self.entries.get_mut(kind) else {
            return Vec::new();
        };
        let handlers = list.iter().map(|entry| Rc::clone(&entry.handler)).collect();
        list.retain(|entry| !entry.once);
        if list.is_empty() {
            self.entries.remove(kind);
        }
        handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Vec<String>;

    fn deliver(registry: &mut Registry<Log>, log: &mut Log, event: &Event) {
        for handler in registry.snapshot(&event.kind()) {
            handler(log, event).unwrap();
        }
    }

    #[test]
    fn test_handlers_run_in_order() {
        let mut registry = Registry::<Log>::new();
        registry.on(EventKind::Ping, |log, _| {
            log.push("first".to_owned());
            Ok(())
        });
        registry.on(EventKind::Ping, |log, event| {
            if let Event::Ping(text) = event {
                log.push(format!("second {}", text));
            }
            Ok(())
        });
        registry.on(EventKind::Quit, |log, _| {
            log.push("quit".to_owned());
            Ok(())
        });

        let mut log = Log::new();
        deliver(&mut registry, &mut log, &Event::Ping("srv".to_owned()));
        assert_eq!(log, vec!["first", "second srv"]);
    }

    #[test]
    fn test_once_and_off() {
        let mut registry = Registry::<Log>::new();
        registry.once(EventKind::Connect, |log, _| {
            log.push("once".to_owned());
            Ok(())
        });
        let id = registry.on(EventKind::Connect, |log, _| {
            log.push("always".to_owned());
            Ok(())
        });

        let mut log = Log::new();
        deliver(&mut registry, &mut log, &Event::Connect);
        deliver(&mut registry, &mut log, &Event::Connect);
        assert_eq!(log, vec!["once", "always", "always"]);

        assert!(registry.off(id));
        assert!(!registry.off(id));
        assert_eq!(registry.listener_count(&EventKind::Connect), 0);
    }

    #[test]
    fn test_numeric_and_raw_keys_are_distinct() {
        let mut registry = Registry::<Log>::new();
        registry.on(EventKind::Numeric(1), |_, _| Ok(()));
        registry.on(EventKind::raw("mode"), |_, _| Ok(()));

        assert_eq!(registry.listener_count(&EventKind::Numeric(1)), 1);
        assert_eq!(registry.listener_count(&EventKind::Numeric(2)), 0);
        assert_eq!(registry.listener_count(&EventKind::raw("MODE")), 1);

        registry.clear(&EventKind::Numeric(1));
        assert_eq!(registry.listener_count(&EventKind::Numeric(1)), 0);
    }
}
