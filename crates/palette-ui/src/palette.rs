//! The palette: a popup that grows from a label into a full menu.
//!
//! # Lifecycle
//!
//! ```text
//!            popup()                    popup anim done           secondary anim done
//! Hidden ────────────▶ PoppingUp ───────────────────▶ PrimaryShown ─────────────────▶ FullyShown
//!   ▲                                                      │                              │
//!   │          popdown anim done                           └────────── popdown() ─────────┤
//!   └──────────────────────────────── PoppingDown ◀───────────────────────────────────────┘
//! ```
//!
//! Three animators drive the transitions; none of them interpolates anything
//! visual, only their final frame matters:
//!
//! - **popup**: on its last frame the menu collapses to the primary row and
//!   the surface is shown next to the invoker.
//! - **secondary**: started together with popup but longer; on its last frame
//!   items, content and buttons are revealed. Quick pointer fly-overs never get
//!   this far, so the expensive rows are laid out only when the user lingers.
//! - **popdown**: started when the pointer leaves; on its last frame the
//!   surface hides. It is slower than popup so that brief exits do not flicker.
//!
//! Focus loss of the invoker's window and a rival palette popping up (see
//! [`crate::observer`]) hide immediately, skipping the popdown animation.
//!
//! # Borrowing
//!
//! Every public method releases the palette's internal borrow before emitting
//! signals or broadcasting on the observer, so handlers may call back into
//! any palette, including this one.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Instant;

use palette_engine::coords::{Point, Rect};
use palette_engine::input::{CrossingEvent, CrossingKind};
use palette_engine::signal::{HandlerId, Signal};
use palette_engine::time::Animator;

use crate::context::PaletteContext;
use crate::error::PaletteError;
use crate::event::{EventResult, InvokerEvent, ObserverEvent, PaletteEvent};
use crate::invoker::Invoker;
use crate::menu::{ActionButton, MenuItem, PaletteMenu};
use crate::observer::PaletteId;
use crate::position::{Placement, Positioner};
use crate::toolkit::{ContentWidget, PopupSurface};

/// Value carried by the last frame of every palette animation.
const FINAL_FRAME: f64 = 1.0;

// ── PaletteState ──────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PaletteState {
    /// Not visible and nothing pending.
    Hidden,
    /// Waiting for the popup animation to finish.
    PoppingUp,
    /// Visible with only the primary row; secondary reveal pending.
    PrimaryShown,
    /// Visible with every non-empty row.
    FullyShown,
    /// Visible, waiting for the popdown animation to finish.
    PoppingDown,
}

// ── internals ─────────────────────────────────────────────────────────────

struct PaletteInner {
    invoker: Option<Weak<dyn Invoker>>,
    invoker_handler: Option<HandlerId>,
    group_id: Option<String>,
    placement: Placement,
    up: bool,
    observer_handler: Option<HandlerId>,
    popup_anim: Animator,
    secondary_anim: Animator,
    popdown_anim: Animator,
    menu: PaletteMenu,
    surface: Box<dyn PopupSurface>,
}

impl PaletteInner {
    fn live_invoker(&self) -> Option<Rc<dyn Invoker>> {
        self.invoker.as_ref().and_then(Weak::upgrade)
    }

    fn state(&self) -> PaletteState {
        if !self.up {
            return if self.popup_anim.is_running() {
                PaletteState::PoppingUp
            } else {
                PaletteState::Hidden
            };
        }
        if self.popdown_anim.is_running() {
            PaletteState::PoppingDown
        } else if self.popup_anim.is_running() {
            PaletteState::PoppingUp
        } else if self.secondary_anim.is_running() {
            PaletteState::PrimaryShown
        } else {
            PaletteState::FullyShown
        }
    }

    fn stop_all(&mut self) {
        self.popup_anim.stop();
        self.secondary_anim.stop();
        self.popdown_anim.stop();
    }

    fn relayout_if_up(&mut self) {
        if self.up {
            self.surface.relayout(&self.menu);
        }
    }
}

struct PaletteShared {
    id: PaletteId,
    ctx: PaletteContext,
    events: Signal<PaletteEvent>,
    inner: RefCell<PaletteInner>,
}

impl Drop for PaletteShared {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if let (Some(invoker), Some(id)) = (inner.live_invoker(), inner.invoker_handler.take()) {
            invoker.events().disconnect(id);
        }
        if let Some(id) = inner.observer_handler.take() {
            self.ctx.observer().disconnect(id);
        }
        if let Some(group) = inner.group_id.take() {
            self.ctx.groups().remove(&group, self.id);
        }
        if inner.up {
            inner.surface.popdown();
        }
    }
}

// ── Palette ───────────────────────────────────────────────────────────────

/// Shared handle to a palette. Clones refer to the same palette.
///
/// ```rust,ignore
/// let palette = Palette::new(&ctx, "Document", None);
/// palette.append_menu_item(MenuItem::new("Share").on_activate(share));
/// palette.set_invoker(&invoker);
/// // from now on pointer events on the invoker drive the palette;
/// // call ctx.tick() from the event loop to deliver animation frames.
/// ```
#[derive(Clone)]
pub struct Palette(Rc<PaletteShared>);

/// Non-owning palette handle.
#[derive(Clone)]
pub struct WeakPalette {
    id: PaletteId,
    shared: Weak<PaletteShared>,
}

impl WeakPalette {
    #[inline]
    pub fn id(&self) -> PaletteId {
        self.id
    }

    pub fn upgrade(&self) -> Option<Palette> {
        self.shared.upgrade().map(Palette)
    }
}

impl Palette {
    /// Creates a hidden palette whose primary row shows `label`.
    pub fn new(ctx: &PaletteContext, label: impl Into<String>, accel_path: Option<&str>) -> Self {
        let config = ctx.config();
        let mut surface = ctx.toolkit().create_popup_surface();
        surface.set_min_width(config.min_width);

        let palette = Palette(Rc::new(PaletteShared {
            id: PaletteId::new(),
            ctx: ctx.clone(),
            events: Signal::new(),
            inner: RefCell::new(PaletteInner {
                invoker: None,
                invoker_handler: None,
                group_id: None,
                placement: Placement::Default,
                up: false,
                observer_handler: None,
                popup_anim: config.popup.animator(),
                secondary_anim: config.secondary.animator(),
                popdown_anim: config.popdown.animator(),
                menu: PaletteMenu::new(label, accel_path),
                surface,
            }),
        }));

        ctx.register(palette.downgrade());
        log::debug!("palette {}: created", palette.id());
        palette
    }

    #[inline]
    pub fn id(&self) -> PaletteId {
        self.0.id
    }

    pub fn downgrade(&self) -> WeakPalette {
        WeakPalette { id: self.0.id, shared: Rc::downgrade(&self.0) }
    }

    #[inline]
    pub fn context(&self) -> &PaletteContext {
        &self.0.ctx
    }

    /// True while the popup surface is visible.
    pub fn is_up(&self) -> bool {
        self.0.inner.borrow().up
    }

    pub fn state(&self) -> PaletteState {
        self.0.inner.borrow().state()
    }

    // ── signals ───────────────────────────────────────────────────────────

    /// Connects to this palette's popup/popdown notifications.
    pub fn connect(&self, f: impl Fn(&PaletteEvent) + 'static) -> HandlerId {
        self.0.events.connect(f)
    }

    pub fn disconnect(&self, id: HandlerId) -> bool {
        self.0.events.disconnect(id)
    }

    // ── configuration ─────────────────────────────────────────────────────

    pub fn placement(&self) -> Placement {
        self.0.inner.borrow().placement
    }

    /// Takes effect the next time the palette pops up.
    pub fn set_placement(&self, placement: Placement) {
        self.0.inner.borrow_mut().placement = placement;
    }

    pub fn invoker(&self) -> Option<Rc<dyn Invoker>> {
        self.0.inner.borrow().live_invoker()
    }

    /// Binds the palette to `invoker`, replacing any previous binding.
    ///
    /// The palette only keeps a weak reference; the owner of the invoker
    /// keeps it alive.
    pub fn set_invoker<I: Invoker + 'static>(&self, invoker: &Rc<I>) {
        let invoker: Rc<dyn Invoker> = invoker.clone();
        self.unbind_invoker();

        let weak = self.downgrade();
        let id = invoker.events().connect(move |ev| {
            let Some(palette) = weak.upgrade() else { return };
            match ev {
                InvokerEvent::MouseEnter => palette.popup(),
                InvokerEvent::MouseLeave => palette.popdown(false),
                InvokerEvent::FocusOut => palette.popdown(true),
            }
        });

        let mut inner = self.0.inner.borrow_mut();
        inner.invoker = Some(Rc::downgrade(&invoker));
        inner.invoker_handler = Some(id);
    }

    /// Drops the invoker binding. The palette stays in its current state.
    pub fn unbind_invoker(&self) {
        let (invoker, handler) = {
            let mut inner = self.0.inner.borrow_mut();
            let invoker = inner.live_invoker();
            inner.invoker = None;
            (invoker, inner.invoker_handler.take())
        };
        if let (Some(invoker), Some(id)) = (invoker, handler) {
            invoker.events().disconnect(id);
        }
    }

    pub fn group_id(&self) -> Option<String> {
        self.0.inner.borrow().group_id.clone()
    }

    /// Moves the palette into `group_id`, leaving its previous group.
    pub fn set_group_id(&self, group_id: Option<&str>) {
        let previous = {
            let mut inner = self.0.inner.borrow_mut();
            std::mem::replace(&mut inner.group_id, group_id.map(str::to_owned))
        };
        let groups = self.0.ctx.groups();
        if let Some(previous) = previous {
            groups.remove(&previous, self.id());
        }
        if let Some(group_id) = group_id {
            groups.add(group_id, self);
        }
    }

    // ── contents ──────────────────────────────────────────────────────────

    pub fn set_primary_text(&self, label: impl Into<String>, accel_path: Option<&str>) {
        let mut inner = self.0.inner.borrow_mut();
        inner.menu.set_primary(label, accel_path);
        inner.relayout_if_up();
    }

    pub fn append_menu_item(&self, item: MenuItem) {
        self.insert_menu_item(item, None);
    }

    /// Inserts among the user items; `None` or an index past the end appends.
    pub fn insert_menu_item(&self, item: MenuItem, index: Option<usize>) {
        let mut inner = self.0.inner.borrow_mut();
        inner.menu.insert_item(item, index);
        inner.relayout_if_up();
    }

    /// Removes the user item at `index`.
    ///
    /// Fails with [`PaletteError::OutOfRange`] when `index >= menu_item_count()`.
    pub fn remove_menu_item(&self, index: usize) -> Result<MenuItem, PaletteError> {
        let mut inner = self.0.inner.borrow_mut();
        let item = inner.menu.remove_item(index)?;
        inner.relayout_if_up();
        Ok(item)
    }

    /// Number of user items, not counting the fixed rows.
    pub fn menu_item_count(&self) -> usize {
        self.0.inner.borrow().menu.item_count()
    }

    /// Replaces the content widget, returning the previous one.
    pub fn set_content(&self, widget: Box<dyn ContentWidget>) -> Option<Box<dyn ContentWidget>> {
        let mut inner = self.0.inner.borrow_mut();
        let previous = inner.menu.set_content(widget);
        inner.relayout_if_up();
        previous
    }

    pub fn append_button(&self, button: ActionButton) {
        let mut inner = self.0.inner.borrow_mut();
        inner.menu.append_button(button);
        inner.relayout_if_up();
    }

    /// Read access to the row model.
    pub fn with_menu<R>(&self, f: impl FnOnce(&PaletteMenu) -> R) -> R {
        f(&self.0.inner.borrow().menu)
    }

    // ── transitions ───────────────────────────────────────────────────────

    /// Starts popping up: cancels a pending popdown and (re)starts the popup
    /// and secondary animations.
    pub fn popup(&self) {
        let now = self.0.ctx.now();
        let mut inner = self.0.inner.borrow_mut();
        inner.popdown_anim.stop();
        inner.popup_anim.start(now);
        inner.secondary_anim.start(now);
        log::debug!("palette {}: popup requested", self.id());
    }

    /// Starts popping down, or hides at once when `immediate`.
    pub fn popdown(&self, immediate: bool) {
        let now = self.0.ctx.now();
        {
            let mut inner = self.0.inner.borrow_mut();
            inner.secondary_anim.stop();
            inner.popup_anim.stop();
            if !immediate {
                inner.popdown_anim.start(now);
                log::debug!("palette {}: popdown requested", self.id());
                return;
            }
            inner.popdown_anim.stop();
        }
        self.hide_surface();
    }

    /// Forward enter/leave notifications of the popup surface here.
    ///
    /// Only nonlinear crossings count; moving between rows of the popup does
    /// not. Entering keeps the palette open and reveals everything, leaving
    /// starts the popdown. Returns [`EventResult::Consumed`] for crossings the
    /// palette acted on.
    pub fn handle_surface_crossing(&self, event: &CrossingEvent) -> EventResult {
        if !event.is_nonlinear() {
            return EventResult::Ignored;
        }
        match event.kind {
            CrossingKind::Enter => {
                let now = self.0.ctx.now();
                let mut inner = self.0.inner.borrow_mut();
                inner.popdown_anim.stop();
                inner.secondary_anim.start(now);
            }
            CrossingKind::Leave => self.popdown(false),
        }
        EventResult::Consumed
    }

    // ── animation driving ─────────────────────────────────────────────────

    /// Delivers due animation frames against the context clock.
    ///
    /// Each animator is polled only after the previous one's frame has been
    /// handled, so a handler that stops an animation wins.
    pub fn tick(&self) {
        let now = self.0.ctx.now();

        let frame = self.0.inner.borrow_mut().popup_anim.poll(now);
        if let Some(value) = frame {
            self.on_popup_frame(value);
        }

        let frame = self.0.inner.borrow_mut().secondary_anim.poll(now);
        if let Some(value) = frame {
            self.on_secondary_frame(value);
        }

        let frame = self.0.inner.borrow_mut().popdown_anim.poll(now);
        if let Some(value) = frame {
            self.on_popdown_frame(value);
        }
    }

    /// When the next animation frame of this palette is due.
    pub fn next_deadline(&self) -> Option<Instant> {
        let inner = self.0.inner.borrow();
        [&inner.popup_anim, &inner.secondary_anim, &inner.popdown_anim]
            .into_iter()
            .filter_map(Animator::next_deadline)
            .min()
    }

    fn on_popup_frame(&self, value: f64) {
        log::trace!("palette {}: popup frame {value:.2}", self.id());
        if value < FINAL_FRAME {
            return;
        }
        self.0.inner.borrow_mut().menu.show_primary_only();
        self.show_surface();
    }

    fn on_secondary_frame(&self, value: f64) {
        log::trace!("palette {}: secondary frame {value:.2}", self.id());
        if value < FINAL_FRAME {
            return;
        }
        self.0.inner.borrow_mut().menu.reveal_secondary();
        self.show_surface();
    }

    fn on_popdown_frame(&self, value: f64) {
        log::trace!("palette {}: popdown frame {value:.2}", self.id());
        if value < FINAL_FRAME {
            return;
        }
        self.hide_surface();
    }

    // ── surface ───────────────────────────────────────────────────────────

    /// Where the surface would be placed right now, or `None` without a live
    /// invoker.
    pub fn compute_origin(&self) -> Option<Point> {
        let inner = self.0.inner.borrow();
        let invoker = inner.live_invoker()?;
        Some(self.origin_for(&inner, invoker.as_ref()))
    }

    fn origin_for(&self, inner: &PaletteInner, invoker: &dyn Invoker) -> Point {
        let ctx = &self.0.ctx;
        let placement = inner.placement.resolve(invoker.default_position());
        let positioner = Positioner::new(
            inner.surface.size_request(&inner.menu),
            invoker.screen_area(),
        );

        let rect = match placement {
            Placement::AtCursor => Rect::around_point(
                ctx.toolkit().pointer_position(),
                ctx.config().cursor_distance,
            ),
            _ => invoker.rect(),
        };
        positioner.place(placement, rect)
    }

    /// Shows the surface next to the invoker and claims exclusivity.
    ///
    /// When already up this only re-lays out the surface so newly revealed
    /// rows appear; nothing is broadcast again.
    fn show_surface(&self) {
        {
            let mut inner = self.0.inner.borrow_mut();
            if inner.up {
                inner.relayout_if_up();
                return;
            }

            let Some(invoker) = inner.live_invoker() else {
                log::warn!("palette {}: no live invoker, not showing", self.id());
                return;
            };

            let origin = self.origin_for(&inner, invoker.as_ref());
            invoker.connect_to_parent();

            let own_id = self.id();
            let weak = self.downgrade();
            let handler = self.0.ctx.observer().connect(move |ev| {
                let ObserverEvent::Popup(other) = *ev;
                if other == own_id {
                    return;
                }
                if let Some(palette) = weak.upgrade() {
                    log::debug!("palette {own_id}: hidden by palette {other}");
                    palette.popdown(true);
                }
            });
            inner.observer_handler = Some(handler);

            let PaletteInner { surface, menu, .. } = &mut *inner;
            surface.popup(origin, menu);
            inner.up = true;
            log::debug!("palette {}: shown at ({}, {})", self.id(), origin.x, origin.y);
        }

        self.0.ctx.observer().emit_popup(self.id());
        self.0.events.emit(&PaletteEvent::Popup);
    }

    /// Hides the surface and gives up exclusivity. No-op when not up.
    fn hide_surface(&self) {
        {
            let mut inner = self.0.inner.borrow_mut();
            if !inner.up {
                inner.stop_all();
                return;
            }
            if let Some(id) = inner.observer_handler.take() {
                self.0.ctx.observer().disconnect(id);
            }
            inner.surface.popdown();
            inner.up = false;
            inner.stop_all();
            log::debug!("palette {}: hidden", self.id());
        }

        self.0.events.emit(&PaletteEvent::Popdown);
    }
}

impl PartialEq for Palette {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Palette {}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.0.inner.borrow();
        f.debug_struct("Palette")
            .field("id", &self.0.id)
            .field("state", &inner.state())
            .field("placement", &inner.placement)
            .field("menu", &inner.menu)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaletteConfig;
    use crate::headless::{HeadlessContent, HeadlessToolkit, HeadlessToplevel, HeadlessWidget};
    use crate::invoker::{CanvasInvoker, WidgetInvoker};
    use crate::headless::HeadlessCanvasItem;
    use palette_engine::coords::Size;
    use palette_engine::input::{CrossingDetail, MotionDetail, MotionEvent};
    use palette_engine::time::ManualClock;

    struct Fixture {
        toolkit: Rc<HeadlessToolkit>,
        clock: Rc<ManualClock>,
        ctx: PaletteContext,
        window: Rc<HeadlessToplevel>,
    }

    impl Fixture {
        fn new() -> Self {
            let toolkit = HeadlessToolkit::new(Size::new(800, 600));
            let clock = Rc::new(ManualClock::new());
            let ctx = PaletteContext::new(toolkit.clone(), clock.clone(), PaletteConfig::default());
            let window = toolkit.create_toplevel();
            Self { toolkit, clock, ctx, window }
        }

        fn widget_invoker(&self, allocation: Rect) -> Rc<WidgetInvoker> {
            let widget = HeadlessWidget::new(&self.window, Point::zero(), allocation);
            Rc::new(WidgetInvoker::new(self.toolkit.clone(), widget))
        }

        fn palette(&self, label: &str, invoker: &Rc<WidgetInvoker>) -> Palette {
            let palette = Palette::new(&self.ctx, label, None);
            palette.set_invoker(invoker);
            palette
        }

        /// Advances the clock in 50ms steps, ticking after each.
        fn run_ms(&self, ms: u64) {
            for _ in 0..ms / 50 {
                self.clock.advance_ms(50);
                self.ctx.tick();
            }
        }
    }

    fn record(palette: &Palette) -> Rc<RefCell<Vec<PaletteEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        palette.connect(move |ev| s.borrow_mut().push(*ev));
        seen
    }

    fn enter() -> CrossingEvent {
        CrossingEvent::enter(CrossingDetail::Nonlinear)
    }

    fn leave() -> CrossingEvent {
        CrossingEvent::leave(CrossingDetail::Nonlinear)
    }

    // ── popup sequence ────────────────────────────────────────────────────

    #[test]
    fn hover_reveals_primary_then_everything() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Title", &invoker);
        palette.append_menu_item(MenuItem::new("Copy"));
        let events = record(&palette);

        invoker.handle_crossing(&enter());
        assert_eq!(palette.state(), PaletteState::PoppingUp);
        assert!(!palette.is_up());

        fx.run_ms(300);
        assert!(palette.is_up());
        assert_eq!(palette.state(), PaletteState::PrimaryShown);
        assert_eq!(*events.borrow(), vec![PaletteEvent::Popup]);
        assert!(palette.with_menu(|m| !m.is_expanded()));

        let surface = fx.toolkit.surface(0).unwrap();
        assert_eq!(surface.rows, vec!["primary:Title"]);
        assert_eq!(surface.origin, Some(Point::new(100, 120)));

        fx.run_ms(700);
        assert_eq!(palette.state(), PaletteState::FullyShown);
        let surface = fx.toolkit.surface(0).unwrap();
        assert_eq!(surface.rows, vec!["primary:Title", "separator", "item:Copy"]);
        assert_eq!(surface.popups, 1);
        assert_eq!(*events.borrow(), vec![PaletteEvent::Popup]);
    }

    #[test]
    fn quick_fly_over_never_shows() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Title", &invoker);
        let events = record(&palette);

        invoker.handle_crossing(&enter());
        fx.run_ms(100);
        invoker.handle_crossing(&leave());
        fx.run_ms(2000);

        assert!(!palette.is_up());
        assert_eq!(palette.state(), PaletteState::Hidden);
        assert!(events.borrow().is_empty());
        assert_eq!(fx.toolkit.surface(0).unwrap().popups, 0);
    }

    #[test]
    fn leave_pops_down_after_animation() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Title", &invoker);
        let events = record(&palette);

        invoker.handle_crossing(&enter());
        fx.run_ms(1000);
        invoker.handle_crossing(&leave());
        assert_eq!(palette.state(), PaletteState::PoppingDown);

        fx.run_ms(550);
        assert!(palette.is_up());
        fx.run_ms(50);
        assert!(!palette.is_up());
        assert_eq!(*events.borrow(), vec![PaletteEvent::Popup, PaletteEvent::Popdown]);
        assert_eq!(fx.ctx.observer().subscriber_count(), 0);
        assert!(fx.toolkit.surface(0).unwrap().origin.is_none());
    }

    #[test]
    fn reentering_cancels_popdown() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Title", &invoker);

        invoker.handle_crossing(&enter());
        fx.run_ms(1000);
        invoker.handle_crossing(&leave());
        fx.run_ms(300);
        invoker.handle_crossing(&enter());
        fx.run_ms(2000);
        assert!(palette.is_up());
    }

    // ── surface crossings ─────────────────────────────────────────────────

    #[test]
    fn entering_surface_keeps_palette_open_and_expands() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Title", &invoker);
        palette.append_button(ActionButton::new("Ok"));

        invoker.handle_crossing(&enter());
        fx.run_ms(300);
        invoker.handle_crossing(&leave());
        palette.handle_surface_crossing(&enter());
        assert_eq!(palette.state(), PaletteState::PrimaryShown);

        fx.run_ms(1000);
        assert!(palette.is_up());
        assert_eq!(palette.state(), PaletteState::FullyShown);
        assert!(palette.with_menu(PaletteMenu::button_bar_visible));
    }

    #[test]
    fn only_nonlinear_surface_crossings_are_consumed() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Title", &invoker);

        invoker.handle_crossing(&enter());
        fx.run_ms(1000);
        let r = palette.handle_surface_crossing(&CrossingEvent::leave(CrossingDetail::Inferior));
        assert_eq!(r, EventResult::Ignored);
        assert_eq!(palette.state(), PaletteState::FullyShown);

        let r = palette.handle_surface_crossing(&leave());
        assert!(r.is_consumed());
        assert_eq!(palette.state(), PaletteState::PoppingDown);

        let r = palette.handle_surface_crossing(&enter());
        assert_eq!(r, EventResult::Consumed);
        assert_eq!(palette.state(), PaletteState::PrimaryShown);
    }

    // ── immediate hides ───────────────────────────────────────────────────

    #[test]
    fn focus_out_hides_without_animation() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Title", &invoker);

        invoker.handle_crossing(&enter());
        fx.run_ms(300);
        assert!(palette.is_up());

        fx.window.set_focused(false);
        assert!(!palette.is_up());
        assert_eq!(palette.state(), PaletteState::Hidden);

        // The pending secondary reveal must not bring it back.
        fx.run_ms(2000);
        assert!(!palette.is_up());
    }

    #[test]
    fn immediate_popdown_when_hidden_emits_nothing() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Title", &invoker);
        let events = record(&palette);

        palette.popdown(true);
        palette.popdown(false);
        fx.run_ms(1000);
        assert!(events.borrow().is_empty());
    }

    // ── mutual exclusion ──────────────────────────────────────────────────

    #[test]
    fn rival_popup_hides_current_palette_once() {
        let fx = Fixture::new();
        let inv_a = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let inv_b = fx.widget_invoker(Rect::new(400, 100, 50, 20));
        let a = fx.palette("A", &inv_a);
        let b = fx.palette("B", &inv_b);
        let events_a = record(&a);
        let events_b = record(&b);

        inv_a.handle_crossing(&enter());
        fx.run_ms(1000);
        assert!(a.is_up());

        // Pointer moves straight from A's invoker to B's.
        inv_a.handle_crossing(&leave());
        inv_b.handle_crossing(&enter());
        fx.run_ms(300);

        assert!(b.is_up());
        assert!(!a.is_up());
        assert_eq!(*events_a.borrow(), vec![PaletteEvent::Popup, PaletteEvent::Popdown]);
        assert_eq!(*events_b.borrow(), vec![PaletteEvent::Popup]);
        assert_eq!(fx.ctx.observer().subscriber_count(), 1);

        fx.run_ms(2000);
        assert_eq!(events_a.borrow().len(), 2);
        assert!(b.is_up());
    }

    #[test]
    fn rival_is_hidden_before_new_palette_reports_popup() {
        let fx = Fixture::new();
        let inv_a = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let inv_b = fx.widget_invoker(Rect::new(400, 100, 50, 20));
        let a = fx.palette("A", &inv_a);
        let b = fx.palette("B", &inv_b);

        inv_a.handle_crossing(&enter());
        fx.run_ms(300);

        let a_up_when_b_popped = Rc::new(RefCell::new(None));
        let seen = Rc::clone(&a_up_when_b_popped);
        let a_handle = a.clone();
        b.connect(move |ev| {
            if *ev == PaletteEvent::Popup {
                *seen.borrow_mut() = Some(a_handle.is_up());
            }
        });

        b.popup();
        fx.run_ms(300);
        assert_eq!(*a_up_when_b_popped.borrow(), Some(false));
    }

    #[test]
    fn show_while_up_does_not_broadcast_again() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Title", &invoker);

        let broadcasts = Rc::new(RefCell::new(0));
        let b = Rc::clone(&broadcasts);
        fx.ctx.observer().connect(move |_| *b.borrow_mut() += 1);

        palette.popup();
        fx.run_ms(300);
        palette.append_menu_item(MenuItem::new("Late"));
        palette.0.inner.borrow_mut().menu.reveal_secondary();
        palette.show_surface();
        palette.show_surface();
        assert_eq!(
            fx.toolkit.surface(0).unwrap().rows,
            vec!["primary:Title", "separator", "item:Late"]
        );
        fx.run_ms(1000);
        assert_eq!(*broadcasts.borrow(), 1);
        assert_eq!(fx.toolkit.surface(0).unwrap().popups, 1);
    }

    // ── placement ─────────────────────────────────────────────────────────

    #[test]
    fn explicit_placement_overrides_invoker_default() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(300, 300, 50, 20));
        let palette = fx.palette("Title", &invoker);
        palette.set_placement(Placement::Top);

        palette.popup();
        fx.run_ms(300);
        let shown = fx.toolkit.surface(0).unwrap();
        assert_eq!(shown.origin, Some(Point::new(300, 300 - shown.size.height)));
    }

    #[test]
    fn canvas_palette_opens_at_cursor() {
        let fx = Fixture::new();
        let item = HeadlessCanvasItem::new(&fx.window, Some(Point::new(200, 200)), Size::new(64, 64));
        let invoker = Rc::new(CanvasInvoker::new(fx.toolkit.clone(), item));
        let palette = Palette::new(&fx.ctx, "Item", None);
        palette.set_invoker(&invoker);

        fx.toolkit.move_pointer(Point::new(220, 230));
        invoker.handle_motion(&MotionEvent { detail: MotionDetail::Enter, position: Point::new(220, 230) });
        fx.run_ms(300);

        assert!(palette.is_up());
        assert_eq!(palette.compute_origin(), Some(Point::new(230, 240)));
        assert_eq!(fx.toolkit.surface(0).unwrap().origin, Some(Point::new(230, 240)));
    }

    #[test]
    fn dead_invoker_prevents_show() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Title", &invoker);
        palette.popup();
        drop(invoker);
        fx.run_ms(300);
        assert!(!palette.is_up());
        assert!(palette.compute_origin().is_none());
    }

    // ── contents while up ─────────────────────────────────────────────────

    #[test]
    fn separator_follows_contents_while_expanded() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Title", &invoker);
        palette.append_menu_item(MenuItem::new("Only"));

        palette.popup();
        fx.run_ms(1000);
        assert!(palette.with_menu(PaletteMenu::separator_visible));

        palette.remove_menu_item(0).unwrap();
        assert_eq!(palette.menu_item_count(), 0);
        assert!(!palette.with_menu(PaletteMenu::separator_visible));
        assert_eq!(fx.toolkit.surface(0).unwrap().rows, vec!["primary:Title"]);

        let content = HeadlessContent::new(Size::new(120, 60));
        palette.set_content(Box::new(content.clone()));
        assert!(palette.with_menu(PaletteMenu::separator_visible));
        content.set_visible(false);
        assert!(!palette.with_menu(PaletteMenu::separator_visible));
    }

    #[test]
    fn remove_out_of_range_reports_count() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Title", &invoker);
        palette.append_button(ActionButton::new("Ok"));
        palette.set_content(Box::new(HeadlessContent::new(Size::new(10, 10))));

        let err = palette.remove_menu_item(0).unwrap_err();
        assert!(matches!(err, PaletteError::OutOfRange { index: 0, count: 0 }));
    }

    #[test]
    fn primary_text_updates_visible_surface() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Old", &invoker);
        palette.popup();
        fx.run_ms(300);
        palette.set_primary_text("New", Some("<Palette>/New"));
        assert_eq!(fx.toolkit.surface(0).unwrap().rows, vec!["primary:New"]);
    }

    // ── bindings ──────────────────────────────────────────────────────────

    #[test]
    fn rebinding_invoker_disconnects_previous() {
        let fx = Fixture::new();
        let first = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let second = fx.widget_invoker(Rect::new(300, 100, 50, 20));
        let palette = fx.palette("Title", &first);

        palette.set_invoker(&second);
        assert_eq!(first.events().handler_count(), 0);
        first.handle_crossing(&enter());
        assert_eq!(palette.state(), PaletteState::Hidden);

        second.handle_crossing(&enter());
        assert_eq!(palette.state(), PaletteState::PoppingUp);
    }

    #[test]
    fn dropping_palette_releases_subscriptions() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Title", &invoker);
        palette.set_group_id(Some("toolbar"));
        palette.popup();
        fx.run_ms(300);
        assert_eq!(fx.ctx.observer().subscriber_count(), 1);

        drop(palette);
        assert_eq!(fx.ctx.observer().subscriber_count(), 0);
        assert_eq!(invoker.events().handler_count(), 0);
        assert!(fx.ctx.groups().members("toolbar").is_empty());
        assert!(fx.ctx.palettes().is_empty());
    }

    #[test]
    fn groups_track_membership_and_visibility() {
        let fx = Fixture::new();
        let inv_a = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let inv_b = fx.widget_invoker(Rect::new(300, 100, 50, 20));
        let a = fx.palette("A", &inv_a);
        let b = fx.palette("B", &inv_b);

        a.set_group_id(Some("tools"));
        b.set_group_id(Some("tools"));
        assert_eq!(fx.ctx.groups().members("tools"), vec![a.clone(), b.clone()]);
        assert!(!fx.ctx.groups().is_up("tools"));

        b.popup();
        fx.run_ms(300);
        assert!(fx.ctx.groups().is_up("tools"));

        b.set_group_id(Some("other"));
        assert_eq!(fx.ctx.groups().members("tools"), vec![a.clone()]);
        assert!(!fx.ctx.groups().is_up("tools"));
        assert_eq!(fx.ctx.groups().group_ids(), vec!["other".to_string(), "tools".to_string()]);

        a.set_group_id(None);
        assert_eq!(a.group_id(), None);
        assert!(fx.ctx.groups().members("tools").is_empty());
    }

    // ── deadlines ─────────────────────────────────────────────────────────

    #[test]
    fn next_deadline_follows_running_animations() {
        let fx = Fixture::new();
        let invoker = fx.widget_invoker(Rect::new(100, 100, 50, 20));
        let palette = fx.palette("Title", &invoker);
        assert_eq!(fx.ctx.next_deadline(), None);

        let t0 = fx.ctx.now();
        palette.popup();
        assert_eq!(fx.ctx.next_deadline(), Some(t0 + std::time::Duration::from_millis(100)));

        fx.run_ms(1000);
        assert_eq!(palette.next_deadline(), None);
    }
}
