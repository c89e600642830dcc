//! In-memory toolkit backend.
//!
//! Nothing is drawn. Surfaces record what a real backend would have shown
//! (origin, size, visible rows) so sessions can be inspected and scripted
//! without a display. Sizes use fixed text metrics.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use palette_engine::coords::{Point, Rect, Size};
use palette_engine::input::{InputEvent, PointerState};
use palette_engine::signal::{HandlerId, Signal};

use crate::menu::{MenuSlot, PaletteMenu};
use crate::toolkit::{CanvasItemHost, ContentWidget, PopupSurface, Toolkit, Toplevel, WidgetHost};

/// Advance of one label character.
pub const CHAR_WIDTH: i32 = 8;
/// Height of the primary row and of each item row.
pub const ROW_HEIGHT: i32 = 24;
pub const SEPARATOR_HEIGHT: i32 = 6;
pub const BUTTON_BAR_HEIGHT: i32 = 32;
/// Horizontal padding on each side of a row.
pub const ROW_PADDING: i32 = 8;

fn label_width(label: &str) -> i32 {
    let chars = i32::try_from(label.chars().count()).unwrap_or(i32::MAX / CHAR_WIDTH);
    chars * CHAR_WIDTH + 2 * ROW_PADDING
}

// ── surfaces ──────────────────────────────────────────────────────────────

/// Snapshot of what one popup surface currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceState {
    pub visible: bool,
    /// Top-left corner while visible.
    pub origin: Option<Point>,
    pub size: Size,
    pub min_width: i32,
    /// One entry per visible row, e.g. `primary:Copy`, `separator`, `item:Paste`.
    pub rows: Vec<String>,
    /// How many times the surface went from hidden to visible.
    pub popups: usize,
}

struct HeadlessSurface {
    state: Rc<RefCell<SurfaceState>>,
}

impl HeadlessSurface {
    fn measure(&self, menu: &PaletteMenu) -> (Size, Vec<String>) {
        let mut width = self.state.borrow().min_width;
        let mut height = 0;
        let mut rows = Vec::new();

        for slot in menu.visible_slots() {
            match slot {
                MenuSlot::Primary(primary) => {
                    width = width.max(label_width(primary.label()));
                    height += ROW_HEIGHT;
                    rows.push(format!("primary:{}", primary.label()));
                }
                MenuSlot::Separator => {
                    height += SEPARATOR_HEIGHT;
                    rows.push("separator".to_owned());
                }
                MenuSlot::Item(item) => {
                    width = width.max(label_width(item.label()));
                    height += ROW_HEIGHT;
                    rows.push(format!("item:{}", item.label()));
                }
                MenuSlot::Content(widget) => {
                    let size = widget.preferred_size();
                    width = width.max(size.width);
                    height += size.height;
                    rows.push("content".to_owned());
                }
                MenuSlot::ButtonBar(buttons) => {
                    let bar: i32 = buttons.iter().map(|b| label_width(b.label())).sum();
                    width = width.max(bar);
                    height += BUTTON_BAR_HEIGHT;
                    let labels: Vec<&str> = buttons.iter().map(|b| b.label()).collect();
                    rows.push(format!("buttons:{}", labels.join(",")));
                }
            }
        }
        (Size::new(width, height), rows)
    }
}

impl PopupSurface for HeadlessSurface {
    fn set_min_width(&mut self, width: i32) {
        self.state.borrow_mut().min_width = width;
    }

    fn size_request(&self, menu: &PaletteMenu) -> Size {
        self.measure(menu).0
    }

    fn popup(&mut self, origin: Point, menu: &PaletteMenu) {
        let (size, rows) = self.measure(menu);
        let mut state = self.state.borrow_mut();
        if !state.visible {
            state.popups += 1;
        }
        state.visible = true;
        state.origin = Some(origin);
        state.size = size;
        state.rows = rows;
    }

    fn relayout(&mut self, menu: &PaletteMenu) {
        let (size, rows) = self.measure(menu);
        let mut state = self.state.borrow_mut();
        state.size = size;
        state.rows = rows;
    }

    fn popdown(&mut self) {
        let mut state = self.state.borrow_mut();
        state.visible = false;
        state.origin = None;
    }

    fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }
}

// ── HeadlessToolkit ───────────────────────────────────────────────────────

pub struct HeadlessToolkit {
    screen: Size,
    pointer: RefCell<PointerState>,
    surfaces: RefCell<Vec<Rc<RefCell<SurfaceState>>>>,
}

impl HeadlessToolkit {
    pub fn new(screen: Size) -> Rc<Self> {
        Rc::new(Self {
            screen,
            pointer: RefCell::new(PointerState::default()),
            surfaces: RefCell::new(Vec::new()),
        })
    }

    /// New focused top-level window.
    pub fn create_toplevel(&self) -> Rc<HeadlessToplevel> {
        Rc::new(HeadlessToplevel {
            focused: Cell::new(true),
            focus_out: Signal::new(),
        })
    }

    /// Feeds pointer input, e.g. translated from window events.
    pub fn apply_event(&self, event: &InputEvent) {
        self.pointer.borrow_mut().apply_event(event);
    }

    pub fn move_pointer(&self, position: Point) {
        self.apply_event(&InputEvent::PointerMoved(position));
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.borrow().len()
    }

    /// State of the `index`-th surface created, in creation order.
    pub fn surface(&self, index: usize) -> Option<SurfaceState> {
        self.surfaces.borrow().get(index).map(|s| s.borrow().clone())
    }

    /// States of every surface currently visible.
    pub fn visible_surfaces(&self) -> Vec<SurfaceState> {
        self.surfaces
            .borrow()
            .iter()
            .map(|s| s.borrow().clone())
            .filter(|s| s.visible)
            .collect()
    }
}

impl Toolkit for HeadlessToolkit {
    fn screen_size(&self) -> Size {
        self.screen
    }

    fn pointer_position(&self) -> Point {
        self.pointer.borrow().position_or_origin()
    }

    fn create_popup_surface(&self) -> Box<dyn PopupSurface> {
        let state = Rc::new(RefCell::new(SurfaceState::default()));
        self.surfaces.borrow_mut().push(Rc::clone(&state));
        Box::new(HeadlessSurface { state })
    }
}

// ── HeadlessToplevel ──────────────────────────────────────────────────────

pub struct HeadlessToplevel {
    focused: Cell<bool>,
    focus_out: Signal<()>,
}

impl HeadlessToplevel {
    #[inline]
    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }

    /// Focus-out handlers run on every focused → unfocused transition.
    pub fn set_focused(&self, focused: bool) {
        let was = self.focused.replace(focused);
        if was && !focused {
            log::debug!("headless: window lost focus");
            self.focus_out.emit(&());
        }
    }

    /// Applies window-level input. Only focus changes affect a toplevel.
    pub fn apply_event(&self, event: &InputEvent) {
        if let InputEvent::Focused(focused) = event {
            self.set_focused(*focused);
        }
    }

    pub fn focus_out_handlers(&self) -> usize {
        self.focus_out.handler_count()
    }
}

impl Toplevel for HeadlessToplevel {
    fn connect_focus_out(&self, f: Box<dyn Fn()>) -> HandlerId {
        self.focus_out.connect(move |_| f())
    }

    fn disconnect_focus_out(&self, id: HandlerId) {
        self.focus_out.disconnect(id);
    }
}

// ── hosts ─────────────────────────────────────────────────────────────────

pub struct HeadlessWidget {
    toplevel: Rc<HeadlessToplevel>,
    window_origin: Cell<Point>,
    allocation: Cell<Rect>,
}

impl HeadlessWidget {
    pub fn new(toplevel: &Rc<HeadlessToplevel>, window_origin: Point, allocation: Rect) -> Rc<Self> {
        Rc::new(Self {
            toplevel: Rc::clone(toplevel),
            window_origin: Cell::new(window_origin),
            allocation: Cell::new(allocation),
        })
    }

    pub fn set_allocation(&self, allocation: Rect) {
        self.allocation.set(allocation);
    }
}

impl WidgetHost for HeadlessWidget {
    fn window_origin(&self) -> Point {
        self.window_origin.get()
    }

    fn allocation(&self) -> Rect {
        self.allocation.get()
    }

    fn toplevel(&self) -> Rc<dyn Toplevel> {
        self.toplevel.clone()
    }
}

pub struct HeadlessCanvasItem {
    toplevel: Rc<HeadlessToplevel>,
    screen_origin: Cell<Option<Point>>,
    size: Cell<Size>,
}

impl HeadlessCanvasItem {
    /// `screen_origin` of `None` models an item detached from any canvas.
    pub fn new(toplevel: &Rc<HeadlessToplevel>, screen_origin: Option<Point>, size: Size) -> Rc<Self> {
        Rc::new(Self {
            toplevel: Rc::clone(toplevel),
            screen_origin: Cell::new(screen_origin),
            size: Cell::new(size),
        })
    }

    pub fn set_screen_origin(&self, origin: Option<Point>) {
        self.screen_origin.set(origin);
    }

    pub fn set_size(&self, size: Size) {
        self.size.set(size);
    }
}

impl CanvasItemHost for HeadlessCanvasItem {
    fn translate_to_screen(&self) -> Option<Point> {
        self.screen_origin.get()
    }

    fn allocation(&self) -> Size {
        self.size.get()
    }

    fn toplevel(&self) -> Rc<dyn Toplevel> {
        self.toplevel.clone()
    }
}

/// Fixed-size content widget. Clones share visibility.
#[derive(Clone)]
pub struct HeadlessContent {
    visible: Rc<Cell<bool>>,
    size: Size,
}

impl HeadlessContent {
    pub fn new(size: Size) -> Self {
        Self { visible: Rc::new(Cell::new(true)), size }
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }
}

impl ContentWidget for HeadlessContent {
    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn preferred_size(&self) -> Size {
        self.size
    }
}
