//! Palette engine crate.
//!
//! This crate owns the toolkit-independent pieces used by `palette-ui`:
//! screen geometry, clocks and frame-stepped animators, typed callback
//! registries, pointer input and logger setup.

pub mod coords;
pub mod input;
pub mod time;

pub mod logging;
pub mod signal;
