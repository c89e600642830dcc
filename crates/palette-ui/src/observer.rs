//! Popup exclusivity broadcast.
//!
//! [`PaletteObserver`] carries one message: "this palette just became
//! visible". A palette subscribes only while it is up, so at any broadcast the
//! subscribers are exactly the visible palettes, and each of them hides itself
//! unless the message is about itself. At most one palette is therefore
//! visible per observer.
//!
//! One observer is created per [`crate::context::PaletteContext`] and shared
//! by every palette built from that context.

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use palette_engine::signal::{HandlerId, Signal};

use crate::event::ObserverEvent;

static NEXT_PALETTE_ID: AtomicU64 = AtomicU64::new(1);

// ── PaletteId ─────────────────────────────────────────────────────────────

/// Unique identifier for a palette, allocated once at construction.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PaletteId(u64);

impl PaletteId {
    /// Allocate a new, globally unique `PaletteId`.
    pub fn new() -> Self {
        PaletteId(NEXT_PALETTE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for PaletteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PaletteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ── PaletteObserver ───────────────────────────────────────────────────────

/// Shared handle to the popup broadcast channel. Cloning shares the channel.
#[derive(Clone, Default)]
pub struct PaletteObserver {
    signal: Rc<Signal<ObserverEvent>>,
}

impl PaletteObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, f: impl Fn(&ObserverEvent) + 'static) -> HandlerId {
        self.signal.connect(f)
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        self.signal.disconnect(id)
    }

    /// Announces that `palette` is now visible.
    pub fn emit_popup(&self, palette: PaletteId) {
        log::debug!("observer: palette {palette} popped up");
        self.signal.emit(&ObserverEvent::Popup(palette));
    }

    /// Number of palettes currently subscribed (i.e. currently up).
    #[inline]
    pub fn subscriber_count(&self) -> usize {
        self.signal.handler_count()
    }
}

impl fmt::Debug for PaletteObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaletteObserver")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn ids_are_unique() {
        assert_ne!(PaletteId::new(), PaletteId::new());
    }

    #[test]
    fn clones_share_the_channel() {
        let observer = PaletteObserver::new();
        let other = observer.clone();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = Rc::clone(&seen);
        let sid = other.connect(move |ev| s.borrow_mut().push(*ev));
        assert_eq!(observer.subscriber_count(), 1);

        let id = PaletteId::new();
        observer.emit_popup(id);
        assert_eq!(*seen.borrow(), vec![ObserverEvent::Popup(id)]);

        assert!(observer.disconnect(sid));
        assert_eq!(other.subscriber_count(), 0);
    }
}
