use crate::coords::Point;

use super::types::{CrossingKind, InputEvent};

/// Current pointer and focus state for one top-level surface.
///
/// Backends use this to answer "where is the pointer" queries, which the
/// at-cursor placement needs.
#[derive(Debug, Default, Clone)]
pub struct PointerState {
    /// Last known pointer position in screen pixels.
    pub position: Option<Point>,

    /// Whether the pointer is inside the surface.
    pub inside: bool,

    /// Whether the surface has keyboard focus.
    pub focused: bool,
}

impl PointerState {
    /// Applies a platform-agnostic input event to the current state.
    pub fn apply_event(&mut self, ev: &InputEvent) {
        match ev {
            InputEvent::PointerMoved(p) => {
                self.position = Some(*p);
                self.inside = true;
            }

            InputEvent::Crossing(c) => {
                self.inside = c.kind == CrossingKind::Enter;
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
            }
        }
    }

    /// Pointer position, or the origin when it was never seen.
    #[inline]
    pub fn position_or_origin(&self) -> Point {
        self.position.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{CrossingDetail, CrossingEvent};

    #[test]
    fn motion_updates_position() {
        let mut state = PointerState::default();
        assert_eq!(state.position_or_origin(), Point::zero());
        state.apply_event(&InputEvent::PointerMoved(Point::new(12, 34)));
        assert_eq!(state.position, Some(Point::new(12, 34)));
        assert!(state.inside);
    }

    #[test]
    fn leave_keeps_last_position() {
        let mut state = PointerState::default();
        state.apply_event(&InputEvent::PointerMoved(Point::new(5, 5)));
        state.apply_event(&InputEvent::Crossing(CrossingEvent::leave(CrossingDetail::Nonlinear)));
        assert!(!state.inside);
        assert_eq!(state.position, Some(Point::new(5, 5)));
    }

    #[test]
    fn focus_tracks_events() {
        let mut state = PointerState::default();
        state.apply_event(&InputEvent::Focused(true));
        assert!(state.focused);
        state.apply_event(&InputEvent::Focused(false));
        assert!(!state.focused);
    }
}
