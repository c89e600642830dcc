//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Glue code is responsible for translating platform events into `InputEvent`s
//! (with the `winit` feature, `platform::winit` provides the winit translation).

pub mod platform;
mod state;
mod types;

pub use state::PointerState;
pub use types::{
    CrossingDetail,
    CrossingEvent,
    CrossingKind,
    InputEvent,
    MotionDetail,
    MotionEvent,
};
