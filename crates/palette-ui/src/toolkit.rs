//! Seams to the windowing toolkit.
//!
//! The palette never creates windows, delivers events or draws anything
//! itself. A backend implements these traits over its own widgets; glue code
//! forwards pointer and focus events to the handler methods on
//! [`crate::invoker::WidgetInvoker`], [`crate::invoker::CanvasInvoker`] and
//! [`crate::palette::Palette`].
//!
//! [`crate::headless`] provides an in-memory implementation.

use std::rc::Rc;

use palette_engine::coords::{Point, Rect, Size};
use palette_engine::signal::HandlerId;

use crate::menu::PaletteMenu;

/// Process-level services of the windowing backend.
pub trait Toolkit {
    /// Size of the screen in pixels. The screen origin is `(0, 0)`.
    fn screen_size(&self) -> Size;

    /// Current pointer position in screen pixels.
    fn pointer_position(&self) -> Point;

    /// Creates a hidden floating surface for one palette.
    fn create_popup_surface(&self) -> Box<dyn PopupSurface>;
}

/// Floating menu-like surface owned by a palette.
///
/// The surface lays out the rows [`PaletteMenu::visible_slots`] reports; it
/// must not cache them across calls since the palette reveals rows while the
/// surface is up.
pub trait PopupSurface {
    /// Lower bound for the surface width.
    fn set_min_width(&mut self, width: i32);

    /// Size the surface would take to show the currently visible rows.
    fn size_request(&self, menu: &PaletteMenu) -> Size;

    /// Shows the surface with its top-left corner at `origin`.
    fn popup(&mut self, origin: Point, menu: &PaletteMenu);

    /// Re-reads visible rows while already shown.
    fn relayout(&mut self, menu: &PaletteMenu);

    /// Hides the surface.
    fn popdown(&mut self);

    fn is_visible(&self) -> bool;
}

/// Top-level window containing an invoker.
pub trait Toplevel {
    /// Calls `f` every time the window loses keyboard focus.
    fn connect_focus_out(&self, f: Box<dyn Fn()>) -> HandlerId;

    fn disconnect_focus_out(&self, id: HandlerId);
}

/// A regular widget that can own a palette.
pub trait WidgetHost {
    /// Screen position of the window the widget draws into.
    fn window_origin(&self) -> Point;

    /// Widget bounds relative to its window.
    fn allocation(&self) -> Rect;

    fn toplevel(&self) -> Rc<dyn Toplevel>;
}

/// An item on a canvas that can own a palette.
pub trait CanvasItemHost {
    /// Screen position of the item's top-left corner, if the item is
    /// currently attached to a rendering context.
    fn translate_to_screen(&self) -> Option<Point>;

    /// Allocated size of the item.
    fn allocation(&self) -> Size;

    fn toplevel(&self) -> Rc<dyn Toplevel>;
}

/// Arbitrary widget placed in a palette's content slot.
pub trait ContentWidget {
    /// Hidden content counts as an empty slot.
    fn is_visible(&self) -> bool;

    fn preferred_size(&self) -> Size;
}
