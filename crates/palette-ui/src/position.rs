//! Popup placement against the screen.
//!
//! Every strategy is built from one primitive: anchor a corner of the popup
//! to a corner of a reference rectangle (the invoker, or a small square
//! around the pointer), described as fractional alignments on each axis.
//!
//! ```text
//! x = rect.x + rect.width  * invoker_h + popup.width  * palette_h
//! y = rect.y + rect.height * invoker_v + popup.height * palette_v
//! ```
//!
//! A candidate is only accepted when the whole popup fits on screen. When
//! every candidate of a chain fails, the last one is returned anyway: a
//! clipped popup is preferred over no popup.

use std::fmt;
use std::str::FromStr;

use palette_engine::coords::{Point, Rect, Size};

use crate::error::PaletteError;

// ── Placement ─────────────────────────────────────────────────────────────

/// Which side of the invoker the palette appears on.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Ask the invoker for its preferred placement.
    #[default]
    Default,
    /// Around the pointer instead of the invoker.
    AtCursor,
    /// Below, else right, else above, else left of the invoker.
    Around,
    Bottom,
    Left,
    Right,
    Top,
}

impl Placement {
    pub const ALL: [Placement; 7] = [
        Placement::Default,
        Placement::AtCursor,
        Placement::Around,
        Placement::Bottom,
        Placement::Left,
        Placement::Right,
        Placement::Top,
    ];

    /// Replaces `Default` with `fallback`. A `Default` fallback becomes `Around`.
    #[inline]
    pub fn resolve(self, fallback: Placement) -> Placement {
        match (self, fallback) {
            (Placement::Default, Placement::Default) => Placement::Around,
            (Placement::Default, other) => other,
            (p, _) => p,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Placement::Default => "default",
            Placement::AtCursor => "at-cursor",
            Placement::Around => "around",
            Placement::Bottom => "bottom",
            Placement::Left => "left",
            Placement::Right => "right",
            Placement::Top => "top",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<i32> for Placement {
    type Error = PaletteError;

    /// Numeric placement codes, in declaration order starting at 0.
    fn try_from(code: i32) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Placement::ALL.get(i).copied())
            .ok_or_else(|| PaletteError::invariant(format!("unknown placement code {code}")))
    }
}

impl FromStr for Placement {
    type Err = PaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Placement::ALL
            .iter()
            .copied()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| PaletteError::invariant(format!("unknown placement '{s}'")))
    }
}

// ── Alignment ─────────────────────────────────────────────────────────────

/// Anchor pair: which popup corner meets which reference corner.
///
/// Popup fractions are in `{-1.0, 0.0}` (popup extends left/up or right/down);
/// reference fractions are in `{0.0, 1.0}` (near or far edge of the rect).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Alignment {
    pub palette_h: f64,
    pub palette_v: f64,
    pub invoker_h: f64,
    pub invoker_v: f64,
}

impl Alignment {
    pub const fn new(palette_h: f64, palette_v: f64, invoker_h: f64, invoker_v: f64) -> Self {
        Self { palette_h, palette_v, invoker_h, invoker_v }
    }
}

const LEFT: [Alignment; 2] = [
    Alignment::new(-1.0, 0.0, 0.0, 0.0),
    Alignment::new(-1.0, -1.0, 0.0, 1.0),
];

const RIGHT: [Alignment; 2] = [
    Alignment::new(0.0, 0.0, 1.0, 0.0),
    Alignment::new(0.0, -1.0, 1.0, 1.0),
];

const TOP: [Alignment; 2] = [
    Alignment::new(0.0, -1.0, 0.0, 0.0),
    Alignment::new(-1.0, -1.0, 1.0, 0.0),
];

const BOTTOM: [Alignment; 2] = [
    Alignment::new(0.0, 0.0, 0.0, 1.0),
    Alignment::new(-1.0, 0.0, 1.0, 1.0),
];

// Clockwise around the pointer, starting below-right.
const AT_CURSOR: [Alignment; 4] = [
    Alignment::new(0.0, 0.0, 1.0, 1.0),
    Alignment::new(0.0, -1.0, 1.0, 0.0),
    Alignment::new(-1.0, -1.0, 0.0, 0.0),
    Alignment::new(-1.0, 0.0, 0.0, 1.0),
];

// ── Positioner ────────────────────────────────────────────────────────────

/// Computes popup origins for a popup of fixed size on a fixed screen area.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Positioner {
    popup: Size,
    screen: Rect,
}

impl Positioner {
    pub const fn new(popup: Size, screen: Rect) -> Self {
        Self { popup, screen }
    }

    #[inline]
    pub fn popup_size(&self) -> Size {
        self.popup
    }

    #[inline]
    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Top-left corner for `align` against `rect`, truncated toward zero.
    pub fn compute_position(&self, align: Alignment, rect: Rect) -> Point {
        let x = f64::from(rect.x)
            + f64::from(rect.width) * align.invoker_h
            + f64::from(self.popup.width) * align.palette_h;
        let y = f64::from(rect.y)
            + f64::from(rect.height) * align.invoker_v
            + f64::from(self.popup.height) * align.palette_v;
        Point::new(x as i32, y as i32)
    }

    /// True when the whole popup at `origin` lies inside the screen area.
    #[inline]
    pub fn in_screen(&self, origin: Point) -> bool {
        self.screen.contains_rect(Rect::from_origin_size(origin, self.popup))
    }

    fn first_in_screen(&self, chain: &[Alignment], rect: Rect) -> Point {
        let mut last = Point::new(rect.x, rect.y);
        for align in chain {
            last = self.compute_position(*align, rect);
            if self.in_screen(last) {
                break;
            }
        }
        last
    }

    pub fn left(&self, rect: Rect) -> Point {
        self.first_in_screen(&LEFT, rect)
    }

    pub fn right(&self, rect: Rect) -> Point {
        self.first_in_screen(&RIGHT, rect)
    }

    pub fn top(&self, rect: Rect) -> Point {
        self.first_in_screen(&TOP, rect)
    }

    pub fn bottom(&self, rect: Rect) -> Point {
        self.first_in_screen(&BOTTOM, rect)
    }

    /// Bottom, right, top, then left; each with its own fallback.
    pub fn around(&self, rect: Rect) -> Point {
        let sides: [fn(&Self, Rect) -> Point; 4] =
            [Self::bottom, Self::right, Self::top, Self::left];

        let mut last = Point::new(rect.x, rect.y);
        for side in sides {
            last = side(self, rect);
            if self.in_screen(last) {
                break;
            }
        }
        last
    }

    /// Four corners around `rect`, which is expected to be the pointer square.
    pub fn at_cursor(&self, rect: Rect) -> Point {
        self.first_in_screen(&AT_CURSOR, rect)
    }

    /// Dispatches on `placement`. `Default` is treated as `Around`; resolve
    /// it against the invoker first to honour the invoker's preference.
    pub fn place(&self, placement: Placement, rect: Rect) -> Point {
        let origin = match placement {
            Placement::Default | Placement::Around => self.around(rect),
            Placement::AtCursor => self.at_cursor(rect),
            Placement::Bottom => self.bottom(rect),
            Placement::Left => self.left(rect),
            Placement::Right => self.right(rect),
            Placement::Top => self.top(rect),
        };

        if !self.in_screen(origin) {
            log::warn!(
                "no {placement} placement fits {}x{} on screen {:?}; using ({}, {})",
                self.popup.width,
                self.popup.height,
                self.screen,
                origin.x,
                origin.y,
            );
        }
        origin
    }
}
