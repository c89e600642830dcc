//! Palette timing and geometry configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! cursor_distance = 10
//! min_width = 75
//!
//! [popup]
//! duration_ms = 300
//! fps = 10
//!
//! [secondary]
//! duration_ms = 1000
//!
//! [popdown]
//! duration_ms = 600
//! ```

use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use palette_engine::time::{Animator, MAX_FPS};
use serde::Deserialize;

use crate::error::PaletteError;

/// Frame rate used when a timing section omits `fps`.
pub const DEFAULT_FPS: u32 = 10;

/// Half-size of the square around the pointer used by at-cursor placement.
pub const DEFAULT_CURSOR_DISTANCE: i32 = 10;

/// One grid cell.
pub const DEFAULT_MIN_WIDTH: i32 = 75;

const CURSOR_DISTANCE_RANGE: RangeInclusive<i32> = 0..=4096;
const MIN_WIDTH_RANGE: RangeInclusive<i32> = 0..=16384;
const FPS_RANGE: RangeInclusive<u32> = 1..=MAX_FPS;

fn default_fps() -> u32 {
    DEFAULT_FPS
}

/// Timing of one palette animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationConfig {
    pub duration_ms: u64,
    #[serde(default = "default_fps")]
    pub fps: u32,
}

impl AnimationConfig {
    pub const fn new(duration_ms: u64, fps: u32) -> Self {
        Self { duration_ms, fps }
    }

    #[inline]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// A stopped `0.0 → 1.0` animator with this timing.
    pub fn animator(&self) -> Animator {
        Animator::new(self.duration(), self.fps)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaletteConfig {
    /// Delay before the primary row appears.
    pub popup: AnimationConfig,
    /// Delay before items, content and buttons are revealed.
    pub secondary: AnimationConfig,
    /// Delay before the palette hides after the pointer leaves.
    pub popdown: AnimationConfig,
    pub cursor_distance: i32,
    pub min_width: i32,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            popup: AnimationConfig::new(300, DEFAULT_FPS),
            secondary: AnimationConfig::new(1000, DEFAULT_FPS),
            popdown: AnimationConfig::new(600, DEFAULT_FPS),
            cursor_distance: DEFAULT_CURSOR_DISTANCE,
            min_width: DEFAULT_MIN_WIDTH,
        }
    }
}

impl PaletteConfig {
    /// Parses a TOML document. Unknown keys and out-of-range values are
    /// rejected.
    pub fn from_toml_str(text: &str) -> Result<Self, PaletteError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value against the range the palette can work with.
    pub fn validate(&self) -> Result<(), PaletteError> {
        for (section, anim) in [
            ("popup", &self.popup),
            ("secondary", &self.secondary),
            ("popdown", &self.popdown),
        ] {
            check_range(&format!("{section}.fps"), anim.fps, &FPS_RANGE)?;
        }
        check_range("cursor_distance", self.cursor_distance, &CURSOR_DISTANCE_RANGE)?;
        check_range("min_width", self.min_width, &MIN_WIDTH_RANGE)
    }

    /// Overrides a single setting by dotted key, e.g. `popup.duration_ms`.
    ///
    /// The config is left untouched when the key is unknown or the value is
    /// unparsable or out of range.
    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<(), PaletteError> {
        let mut next = self.clone();
        next.set(key, value)?;
        next.validate()?;
        *self = next;
        log::debug!("config override {key} = {value}");
        Ok(())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PaletteError> {
        match key {
            "cursor_distance" => self.cursor_distance = parse_value(key, value)?,
            "min_width" => self.min_width = parse_value(key, value)?,
            _ => {
                let (section, field) = key
                    .split_once('.')
                    .ok_or_else(|| unknown_key(key))?;
                let anim = match section {
                    "popup" => &mut self.popup,
                    "secondary" => &mut self.secondary,
                    "popdown" => &mut self.popdown,
                    _ => return Err(unknown_key(key)),
                };
                match field {
                    "duration_ms" => anim.duration_ms = parse_value(key, value)?,
                    "fps" => anim.fps = parse_value(key, value)?,
                    _ => return Err(unknown_key(key)),
                }
            }
        }
        Ok(())
    }
}

fn check_range<T>(key: &str, value: T, range: &RangeInclusive<T>) -> Result<(), PaletteError>
where
    T: PartialOrd + Display,
{
    if range.contains(&value) {
        Ok(())
    } else {
        Err(PaletteError::invariant(format!(
            "'{key}' must be within {}..={}, got {value}",
            range.start(),
            range.end()
        )))
    }
}

fn unknown_key(key: &str) -> PaletteError {
    PaletteError::invariant(format!("unknown palette setting '{key}'"))
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, PaletteError> {
    value
        .trim()
        .parse()
        .map_err(|_| PaletteError::invariant(format!("invalid value '{value}' for '{key}'")))
}
