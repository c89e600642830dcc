//! Palette UI: hover popups that grow from a label into a full menu.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use palette_ui::prelude::*;
//!
//! let ctx = PaletteContext::new(toolkit, Rc::new(SystemClock), PaletteConfig::default());
//!
//! let invoker = Rc::new(WidgetInvoker::new(ctx.toolkit().clone(), button_host));
//! let palette = Palette::new(&ctx, "Document", None);
//! palette.append_menu_item(MenuItem::new("Share").on_activate(|| println!("shared")));
//! palette.set_invoker(&invoker);
//!
//! // Glue: forward crossings of the button to the invoker, crossings of the
//! // popup surface to the palette, and tick the context from the event loop.
//! invoker.handle_crossing(&crossing);
//! ctx.tick();
//! ```
//!
//! # Backends
//!
//! Implement the traits in [`toolkit`] for a windowing toolkit. [`headless`]
//! implements them in memory.

pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod group;
pub mod headless;
pub mod invoker;
pub mod menu;
pub mod observer;
pub mod palette;
pub mod position;
pub mod toolkit;

pub use context::PaletteContext;
pub use palette::{Palette, PaletteState};

/// Everything needed to build palettes and wire them to a backend.
pub mod prelude {
    pub use crate::config::{AnimationConfig, PaletteConfig};
    pub use crate::context::PaletteContext;
    pub use crate::error::PaletteError;
    pub use crate::event::{EventResult, InvokerEvent, ObserverEvent, PaletteEvent};
    pub use crate::invoker::{CanvasInvoker, Invoker, WidgetInvoker};
    pub use crate::menu::{ActionButton, MenuItem, MenuSlot, PaletteMenu};
    pub use crate::observer::{PaletteId, PaletteObserver};
    pub use crate::palette::{Palette, PaletteState, WeakPalette};
    pub use crate::position::{Placement, Positioner};
    pub use crate::toolkit::{
        CanvasItemHost, ContentWidget, PopupSurface, Toolkit, Toplevel, WidgetHost,
    };

    pub use palette_engine::coords::{Point, Rect, Size};
    pub use palette_engine::input::{CrossingDetail, CrossingEvent, MotionDetail, MotionEvent};
    pub use palette_engine::time::{Clock, ManualClock, SystemClock};
}
