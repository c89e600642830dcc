use crate::observer::PaletteId;

/// Notifications emitted by an [`crate::invoker::Invoker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokerEvent {
    /// Pointer entered the invoking widget or canvas item.
    MouseEnter,
    /// Pointer left the invoking widget or canvas item.
    MouseLeave,
    /// The invoker's top-level window lost keyboard focus.
    FocusOut,
}

/// Notifications emitted by a [`crate::palette::Palette`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteEvent {
    /// The popup surface became visible.
    Popup,
    /// The popup surface was hidden.
    Popdown,
}

/// Broadcasts carried by the [`crate::observer::PaletteObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObserverEvent {
    /// `PaletteId` has just become visible.
    Popup(PaletteId),
}

/// What a handler did with a forwarded toolkit event.
///
/// Invokers only observe pointer traffic, so their handlers always report
/// `Ignored` and the host widget keeps its own enter/leave handling. A palette
/// reports `Consumed` for popup-surface crossings that changed its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// The palette acted on the event; glue code should not route it further.
    Consumed,
    /// Observed only. Route the event as if no palette were attached.
    Ignored,
}

impl EventResult {
    #[inline]
    pub fn is_consumed(self) -> bool {
        matches!(self, EventResult::Consumed)
    }
}
