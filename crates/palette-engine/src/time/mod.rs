//! Time subsystem.
//!
//! Provides clocks and frame-stepped animators without coupling to an event loop.
//! Intended usage:
//! - hand one `Clock` to everything that schedules frames
//! - call `Animator::poll(now)` whenever the loop wakes up, and sleep until
//!   `Animator::next_deadline()` otherwise

mod animator;
mod clock;

pub use animator::{Animator, MAX_FPS};
pub use clock::{Clock, ManualClock, SystemClock};
