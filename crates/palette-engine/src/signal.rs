//! Typed callback registries.
//!
//! A [`Signal`] is the single-threaded observer primitive used by invokers,
//! palettes and the palette observer. Handlers are called in connection order.
//!
//! # Re-entrancy
//!
//! [`Signal::emit`] snapshots the handler list before calling anything, so a
//! handler may connect or disconnect handlers (including itself) or emit on
//! the same signal. Handlers disconnected during an emission that has not yet
//! reached them are skipped.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Identifies one connected handler. Ids are never reused within a signal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct HandlerId(u64);

type Handler<E> = Rc<dyn Fn(&E)>;

/// Broadcast channel for events of type `E`.
pub struct Signal<E> {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(HandlerId, Handler<E>)>>,
}

impl<E> Signal<E> {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Connects `f` and returns the id needed to disconnect it.
    pub fn connect(&self, f: impl Fn(&E) + 'static) -> HandlerId {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers.borrow_mut().push((id, Rc::new(f)));
        id
    }

    /// Disconnects a handler. Returns `false` if `id` was not connected.
    pub fn disconnect(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(hid, _)| *hid != id);
        handlers.len() != before
    }

    #[inline]
    pub fn is_connected(&self, id: HandlerId) -> bool {
        self.handlers.borrow().iter().any(|(hid, _)| *hid == id)
    }

    #[inline]
    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Calls every connected handler with `event`.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<(HandlerId, Handler<E>)> = self
            .handlers
            .borrow()
            .iter()
            .map(|(id, h)| (*id, Rc::clone(h)))
            .collect();

        for (id, handler) in snapshot {
            if self.is_connected(id) {
                handler(event);
            }
        }
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("handlers", &self.handler_count())
            .finish()
    }
}
