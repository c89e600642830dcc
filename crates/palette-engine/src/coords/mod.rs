//! Integer screen geometry shared by invokers, the positioning engine and
//! toolkit backends.
//!
//! Canonical space:
//! - Screen pixels
//! - Origin top-left
//! - +X right, +Y down

mod point;
mod rect;
mod size;

pub use point::Point;
pub use rect::Rect;
pub use size::Size;
