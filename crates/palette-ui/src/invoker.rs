//! Things that own and trigger a palette.
//!
//! An [`Invoker`] answers two questions for its palette: where is the thing
//! that triggered it, and when does the pointer come and go. Glue code feeds
//! raw toolkit events into [`WidgetInvoker::handle_crossing`] or
//! [`CanvasInvoker::handle_motion`]; the invoker turns them into
//! [`InvokerEvent`]s that the bound palette reacts to.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use palette_engine::coords::{Point, Rect};
use palette_engine::input::{CrossingEvent, CrossingKind, MotionDetail, MotionEvent};
use palette_engine::signal::{HandlerId, Signal};

use crate::event::{EventResult, InvokerEvent};
use crate::position::Placement;
use crate::toolkit::{CanvasItemHost, Toolkit, Toplevel, WidgetHost};

// ── Invoker trait ─────────────────────────────────────────────────────────

pub trait Invoker {
    /// Bounds of the invoker in screen coordinates.
    fn rect(&self) -> Rect;

    /// Area the palette must stay inside.
    fn screen_area(&self) -> Rect;

    /// Placement used when the palette's own placement is `Default`.
    fn default_position(&self) -> Placement {
        Placement::Around
    }

    /// Makes focus loss of the invoker's top-level window emit
    /// [`InvokerEvent::FocusOut`]. Calling it again is a no-op.
    fn connect_to_parent(&self);

    fn events(&self) -> &Signal<InvokerEvent>;
}

fn screen_area_of(toolkit: &dyn Toolkit) -> Rect {
    let size = toolkit.screen_size();
    Rect::new(0, 0, size.width, size.height)
}

// ── ParentFocus ───────────────────────────────────────────────────────────

/// Focus-out subscription on an invoker's top-level window.
#[derive(Default)]
struct ParentFocus {
    connected: RefCell<Option<(Rc<dyn Toplevel>, HandlerId)>>,
}

impl ParentFocus {
    fn connect(&self, toplevel: Rc<dyn Toplevel>, events: &Rc<Signal<InvokerEvent>>) {
        let mut connected = self.connected.borrow_mut();

        if let Some((current, _)) = connected.as_ref() {
            if same_toplevel(current, &toplevel) {
                return;
            }
        }
        if let Some((old, id)) = connected.take() {
            old.disconnect_focus_out(id);
        }

        let weak: Weak<Signal<InvokerEvent>> = Rc::downgrade(events);
        let id = toplevel.connect_focus_out(Box::new(move || {
            if let Some(events) = weak.upgrade() {
                events.emit(&InvokerEvent::FocusOut);
            }
        }));
        log::debug!("invoker: listening for parent focus-out");
        *connected = Some((toplevel, id));
    }
}

impl Drop for ParentFocus {
    fn drop(&mut self) {
        if let Some((toplevel, id)) = self.connected.get_mut().take() {
            toplevel.disconnect_focus_out(id);
        }
    }
}

fn same_toplevel(a: &Rc<dyn Toplevel>, b: &Rc<dyn Toplevel>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

// ── WidgetInvoker ─────────────────────────────────────────────────────────

/// Invoker wrapping a regular widget.
///
/// Emits mouse-enter/leave from the widget's own crossing notifications and
/// places its palette around the widget by default.
pub struct WidgetInvoker {
    widget: Rc<dyn WidgetHost>,
    toolkit: Rc<dyn Toolkit>,
    events: Rc<Signal<InvokerEvent>>,
    parent: ParentFocus,
}

impl WidgetInvoker {
    pub fn new(toolkit: Rc<dyn Toolkit>, widget: Rc<dyn WidgetHost>) -> Self {
        Self {
            widget,
            toolkit,
            events: Rc::new(Signal::new()),
            parent: ParentFocus::default(),
        }
    }

    /// Forward the widget's enter/leave notifications here.
    pub fn handle_crossing(&self, event: &CrossingEvent) -> EventResult {
        let ev = match event.kind {
            CrossingKind::Enter => InvokerEvent::MouseEnter,
            CrossingKind::Leave => InvokerEvent::MouseLeave,
        };
        self.events.emit(&ev);
        EventResult::Ignored
    }
}

impl Invoker for WidgetInvoker {
    fn rect(&self) -> Rect {
        self.widget.allocation().translate(self.widget.window_origin())
    }

    fn screen_area(&self) -> Rect {
        screen_area_of(self.toolkit.as_ref())
    }

    fn connect_to_parent(&self) {
        self.parent.connect(self.widget.toplevel(), &self.events);
    }

    fn events(&self) -> &Signal<InvokerEvent> {
        &self.events
    }
}

// ── CanvasInvoker ─────────────────────────────────────────────────────────

/// Invoker wrapping a canvas item.
///
/// Canvas items only report motion, so mouse-enter/leave come from the
/// enter/leave detail of motion events. Palettes open at the pointer by
/// default.
pub struct CanvasInvoker {
    item: Rc<dyn CanvasItemHost>,
    toolkit: Rc<dyn Toolkit>,
    events: Rc<Signal<InvokerEvent>>,
    parent: ParentFocus,
}

impl CanvasInvoker {
    pub fn new(toolkit: Rc<dyn Toolkit>, item: Rc<dyn CanvasItemHost>) -> Self {
        Self {
            item,
            toolkit,
            events: Rc::new(Signal::new()),
            parent: ParentFocus::default(),
        }
    }

    /// Forward the item's motion events here. Motion is never consumed.
    pub fn handle_motion(&self, event: &MotionEvent) -> EventResult {
        match event.detail {
            MotionDetail::Enter => self.events.emit(&InvokerEvent::MouseEnter),
            MotionDetail::Leave => self.events.emit(&InvokerEvent::MouseLeave),
            MotionDetail::WithinItem => {}
        }
        EventResult::Ignored
    }
}

impl Invoker for CanvasInvoker {
    fn rect(&self) -> Rect {
        let origin = self.item.translate_to_screen().unwrap_or_else(|| {
            log::warn!("canvas invoker: item has no rendering context, assuming origin");
            Point::zero()
        });
        Rect::from_origin_size(origin, self.item.allocation())
    }

    fn screen_area(&self) -> Rect {
        screen_area_of(self.toolkit.as_ref())
    }

    fn default_position(&self) -> Placement {
        Placement::AtCursor
    }

    fn connect_to_parent(&self) {
        self.parent.connect(self.item.toplevel(), &self.events);
    }

    fn events(&self) -> &Signal<InvokerEvent> {
        &self.events
    }
}
