//! Transient per-dispatch context.
//!
//! While an event is being delivered, subscribers can ask the client who
//! sent it, which target it concerns, which numeric it carries and so on.
//! That view lives on a stack: every dispatch pushes a copy of the current
//! frame with its own fields filled in, and a guard pops it when the
//! dispatch ends, whether the subscribers returned, failed or panicked.
//! Nested dispatches therefore see their own fields and restore the outer
//! view on the way out. Outside any dispatch the context is empty.

use std::ops::{Deref, DerefMut};

use crate::event::EventKind;

/// What the event currently being delivered is about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventContext {
    /// Sender `user@host`.
    pub address: Option<String>,
    /// Channel the event concerns.
    pub channel: Option<String>,
    /// Event being delivered.
    pub event: Option<EventKind>,
    /// Sender `nick!user@host`.
    pub full_address: Option<String>,
    /// Sender nickname (or server name).
    pub nick: Option<String>,
    /// Numeric code of a numeric reply.
    pub numeric: Option<u16>,
    /// The raw line being classified.
    pub raw: Option<String>,
    /// Sender host.
    pub site: Option<String>,
    /// Target of the event.
    pub target: Option<String>,
}

static BASELINE: EventContext = EventContext {
    address: None,
    channel: None,
    event: None,
    full_address: None,
    nick: None,
    numeric: None,
    raw: None,
    site: None,
    target: None,
};

impl EventContext {
    /// Whether every field is unset.
    pub fn is_empty(&self) -> bool {
        *self == BASELINE
    }
}

/// Stack of context frames, one per dispatch in progress.
#[derive(Debug, Default)]
pub struct ContextStack {
    frames: Vec<EventContext>,
}

impl ContextStack {
    /// The innermost frame, or the empty context outside any dispatch.
    pub fn current(&self) -> &EventContext {
        self.frames.last().unwrap_or(&BASELINE)
    }

    /// Number of dispatches in progress.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn push(&mut self, frame: EventContext) {
        self.frames.push(frame);
    }

    fn pop(&mut self) {
        self.frames.pop();
    }
}

impl AsMut<ContextStack> for ContextStack {
    fn as_mut(&mut self) -> &mut ContextStack {
        self
    }
}

/// Keeps a frame pushed for as long as it lives.
///
/// Dereferences to the holder so the dispatch can keep using it.
pub(crate) struct ContextGuard<'a, H: AsMut<ContextStack>> {
    holder: &'a mut H,
}

/// Push a frame derived from the current one and return its guard.
pub(crate) fn enter<H, F>(holder: &mut H, update: F) -> ContextGuard<'_, H>
where
    H: AsMut<ContextStack>,
    F: FnOnce(&mut EventContext),
{
    let stack = holder.as_mut();
    let mut frame = stack.current().clone();
    update(&mut frame);
    stack.push(frame);
    ContextGuard { holder }
}

impl<H: AsMut<ContextStack>> Deref for ContextGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.holder
    }
}

impl<H: AsMut<ContextStack>> DerefMut for ContextGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.holder
    }
}

impl<H: AsMut<ContextStack>> Drop for ContextGuard<'_, H> {
    fn drop(&mut self) {
        self.holder.as_mut().pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_outside_dispatch() {
        let stack = ContextStack::default();
        assert!(stack.current().is_empty());
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn test_nested_frames_restore() {
        let mut stack = ContextStack::default();
        {
            let mut outer = enter(&mut stack, |ctx| ctx.target = Some("#outer".to_owned()));
            assert_eq!(outer.current().target.as_deref(), Some("#outer"));
            {
                let inner = enter(&mut *outer, |ctx| ctx.numeric = Some(1));
                assert_eq!(inner.current().target.as_deref(), Some("#outer"));
                assert_eq!(inner.current().numeric, Some(1));
                assert_eq!(inner.depth(), 2);
            }
            assert_eq!(outer.current().numeric, None);
            assert_eq!(outer.depth(), 1);
        }
        assert!(stack.current().is_empty());
    }

    #[test]
    fn test_pop_on_early_return() {
        fn fail(stack: &mut ContextStack) -> Result<(), ()> {
            let _guard = enter(stack, |ctx| ctx.nick = Some("bob".to_owned()));
            Err(())
        }

        let mut stack = ContextStack::default();
        assert!(fail(&mut stack).is_err());
        assert!(stack.current().is_empty());
    }

    #[test]
    fn test_pop_on_panic() {
        let mut stack = ContextStack::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = enter(&mut stack, |ctx| ctx.raw = Some("PING :x".to_owned()));
            panic!("subscriber blew up");
        }));
        assert!(result.is_err());
        assert_eq!(stack.depth(), 0);
    }
}
