//! Row model of a palette's popup surface.
//!
//! Rows always appear in this order:
//!
//! ```text
//! primary label
//! separator
//! user items...        (index space of insert/remove)
//! content slot
//! button bar
//! ```
//!
//! The menu is either *collapsed* (primary row only) or *expanded*. While
//! expanded, the separator is visible exactly when at least one of the
//! items, the content slot or the button bar is non-empty, and the content
//! slot and button bar are visible exactly when non-empty. Visibility is
//! derived on every query, so it can never drift from the contents.

use std::fmt;
use std::rc::Rc;

use crate::error::PaletteError;
use crate::toolkit::ContentWidget;

type Callback = Rc<dyn Fn()>;

// ── rows ──────────────────────────────────────────────────────────────────

/// Label row shown as soon as the palette pops up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryItem {
    label: String,
    accel_path: Option<String>,
}

impl PrimaryItem {
    pub fn new(label: impl Into<String>, accel_path: Option<&str>) -> Self {
        Self { label: label.into(), accel_path: accel_path.map(str::to_owned) }
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn accel_path(&self) -> Option<&str> {
        self.accel_path.as_deref()
    }
}

/// User-supplied menu row.
///
/// ```rust,ignore
/// MenuItem::new("Copy")
///     .accel_path("<Palette>/Copy")
///     .on_activate(|| println!("copied"))
/// ```
#[derive(Clone)]
pub struct MenuItem {
    label: String,
    accel_path: Option<String>,
    on_activate: Option<Callback>,
}

impl MenuItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), accel_path: None, on_activate: None }
    }

    pub fn accel_path(mut self, path: impl Into<String>) -> Self {
        self.accel_path = Some(path.into());
        self
    }

    pub fn on_activate(mut self, f: impl Fn() + 'static) -> Self {
        self.on_activate = Some(Rc::new(f));
        self
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn accel(&self) -> Option<&str> {
        self.accel_path.as_deref()
    }

    /// Runs the activation callback, if any.
    pub fn activate(&self) {
        if let Some(f) = &self.on_activate {
            f();
        }
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("label", &self.label)
            .field("accel_path", &self.accel_path)
            .finish_non_exhaustive()
    }
}

/// Button in the palette's button bar.
#[derive(Clone)]
pub struct ActionButton {
    label: String,
    on_click: Option<Callback>,
}

impl ActionButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), on_click: None }
    }

    pub fn on_click(mut self, f: impl Fn() + 'static) -> Self {
        self.on_click = Some(Rc::new(f));
        self
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn click(&self) {
        if let Some(f) = &self.on_click {
            f();
        }
    }
}

impl fmt::Debug for ActionButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionButton").field("label", &self.label).finish_non_exhaustive()
    }
}

/// One visible row, in display order.
pub enum MenuSlot<'a> {
    Primary(&'a PrimaryItem),
    Separator,
    Item(&'a MenuItem),
    Content(&'a dyn ContentWidget),
    ButtonBar(&'a [ActionButton]),
}

// ── PaletteMenu ───────────────────────────────────────────────────────────

pub struct PaletteMenu {
    primary: PrimaryItem,
    items: Vec<MenuItem>,
    content: Option<Box<dyn ContentWidget>>,
    buttons: Vec<ActionButton>,
    expanded: bool,
}

impl PaletteMenu {
    /// New collapsed menu with only a primary row.
    pub fn new(label: impl Into<String>, accel_path: Option<&str>) -> Self {
        Self {
            primary: PrimaryItem::new(label, accel_path),
            items: Vec::new(),
            content: None,
            buttons: Vec::new(),
            expanded: false,
        }
    }

    #[inline]
    pub fn primary(&self) -> &PrimaryItem {
        &self.primary
    }

    pub fn set_primary(&mut self, label: impl Into<String>, accel_path: Option<&str>) {
        self.primary = PrimaryItem::new(label, accel_path);
    }

    // ── items ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Number of user items; the fixed rows are not counted.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn append_item(&mut self, item: MenuItem) {
        self.items.push(item);
    }

    /// Inserts at `index`, or appends for `None`. Indexes past the end append,
    /// so items can never land among the trailing fixed rows.
    pub fn insert_item(&mut self, item: MenuItem, index: Option<usize>) {
        let at = index.map_or(self.items.len(), |i| i.min(self.items.len()));
        self.items.insert(at, item);
    }

    pub fn remove_item(&mut self, index: usize) -> Result<MenuItem, PaletteError> {
        if index >= self.items.len() {
            return Err(PaletteError::OutOfRange { index, count: self.items.len() });
        }
        Ok(self.items.remove(index))
    }

    // ── content / buttons ─────────────────────────────────────────────────

    /// Replaces the content widget, returning the previous one.
    pub fn set_content(&mut self, widget: Box<dyn ContentWidget>) -> Option<Box<dyn ContentWidget>> {
        self.content.replace(widget)
    }

    pub fn content(&self) -> Option<&dyn ContentWidget> {
        self.content.as_deref()
    }

    #[inline]
    pub fn content_is_empty(&self) -> bool {
        self.content.as_ref().is_none_or(|w| !w.is_visible())
    }

    pub fn append_button(&mut self, button: ActionButton) {
        self.buttons.push(button);
    }

    #[inline]
    pub fn buttons(&self) -> &[ActionButton] {
        &self.buttons
    }

    #[inline]
    pub fn button_bar_is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// True when anything besides the primary row has something to show.
    #[inline]
    pub fn has_secondary(&self) -> bool {
        !self.items.is_empty() || !self.content_is_empty() || !self.button_bar_is_empty()
    }

    // ── stages ────────────────────────────────────────────────────────────

    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Hides every row except the primary one.
    pub fn show_primary_only(&mut self) {
        self.expanded = false;
    }

    /// Reveals items, non-empty content and buttons, and the separator.
    pub fn reveal_secondary(&mut self) {
        self.expanded = true;
    }

    // ── visibility ────────────────────────────────────────────────────────

    #[inline]
    pub fn separator_visible(&self) -> bool {
        self.expanded && self.has_secondary()
    }

    #[inline]
    pub fn items_visible(&self) -> bool {
        self.expanded
    }

    #[inline]
    pub fn content_visible(&self) -> bool {
        self.expanded && !self.content_is_empty()
    }

    #[inline]
    pub fn button_bar_visible(&self) -> bool {
        self.expanded && !self.button_bar_is_empty()
    }

    /// Visible rows in display order.
    pub fn visible_slots(&self) -> Vec<MenuSlot<'_>> {
        let mut slots = vec![MenuSlot::Primary(&self.primary)];
        if self.separator_visible() {
            slots.push(MenuSlot::Separator);
        }
        if self.items_visible() {
            slots.extend(self.items.iter().map(MenuSlot::Item));
        }
        if self.content_visible() {
            if let Some(w) = self.content.as_deref() {
                slots.push(MenuSlot::Content(w));
            }
        }
        if self.button_bar_visible() {
            slots.push(MenuSlot::ButtonBar(&self.buttons));
        }
        slots
    }
}

impl fmt::Debug for PaletteMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaletteMenu")
            .field("primary", &self.primary)
            .field("items", &self.items)
            .field("has_content", &self.content.is_some())
            .field("buttons", &self.buttons)
            .field("expanded", &self.expanded)
            .finish()
    }
}
