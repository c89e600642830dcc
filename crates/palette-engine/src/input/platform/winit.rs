use winit::dpi::PhysicalPosition;
use winit::event::WindowEvent;

use crate::coords::Point;
use crate::input::{CrossingDetail, CrossingEvent, InputEvent};

/// Translates a winit `WindowEvent` into an engine `InputEvent`.
///
/// Window-level crossings always happen between unrelated surfaces, so they
/// are reported with [`CrossingDetail::Nonlinear`].
///
/// Returns `None` for events not represented by the input subsystem.
pub fn translate_window_event(scale_factor: f64, event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::CursorEntered { .. } => Some(InputEvent::Crossing(CrossingEvent::enter(
            CrossingDetail::Nonlinear,
        ))),

        WindowEvent::CursorLeft { .. } => Some(InputEvent::Crossing(CrossingEvent::leave(
            CrossingDetail::Nonlinear,
        ))),

        WindowEvent::CursorMoved { position, .. } => {
            Some(InputEvent::PointerMoved(to_logical_point(scale_factor, *position)))
        }

        _ => None,
    }
}

fn to_logical_point(scale_factor: f64, pos: PhysicalPosition<f64>) -> Point {
    let logical = pos.to_logical::<f64>(scale_factor);
    Point::new(logical.x.round() as i32, logical.y.round() as i32)
}
