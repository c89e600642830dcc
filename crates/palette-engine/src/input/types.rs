use std::fmt;

use crate::coords::Point;

/// Direction of a pointer crossing notification.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CrossingKind {
    Enter,
    Leave,
}

/// How the pointer moved relative to the surface that received a crossing.
///
/// Mirrors the X11 notify details. Only [`CrossingDetail::Nonlinear`] marks a
/// real crossing between unrelated surfaces; the others describe movement into
/// or out of child surfaces of the same popup.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CrossingDetail {
    Ancestor,
    Virtual,
    Inferior,
    Nonlinear,
    NonlinearVirtual,
    Unknown,
}

/// Pointer entered or left a surface.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CrossingEvent {
    pub kind: CrossingKind,
    pub detail: CrossingDetail,
}

impl CrossingEvent {
    #[inline]
    pub const fn enter(detail: CrossingDetail) -> Self {
        Self { kind: CrossingKind::Enter, detail }
    }

    #[inline]
    pub const fn leave(detail: CrossingDetail) -> Self {
        Self { kind: CrossingKind::Leave, detail }
    }

    #[inline]
    pub fn is_nonlinear(&self) -> bool {
        self.detail == CrossingDetail::Nonlinear
    }
}

/// Detail code carried by canvas motion events.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MotionDetail {
    /// Pointer just entered the item.
    Enter,
    /// Pointer just left the item.
    Leave,
    /// Pointer moved while staying inside the item.
    WithinItem,
}

/// Pointer motion over a canvas item.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MotionEvent {
    pub detail: MotionDetail,
    pub position: Point,
}

/// Platform-agnostic input events consumed by toolkit backends.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to a screen position.
    PointerMoved(Point),

    /// Pointer crossed into or out of a surface.
    Crossing(CrossingEvent),

    /// Top-level focus change.
    Focused(bool),
}

impl fmt::Display for CrossingDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
