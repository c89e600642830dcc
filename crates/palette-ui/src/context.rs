//! Shared environment of a set of palettes.
//!
//! A [`PaletteContext`] bundles what every palette of an application shares:
//! the toolkit backend, the clock animations run against, the popup observer,
//! the configuration and the palette groups. Create one at startup and pass it
//! to every [`Palette::new`]. Palettes built from different contexts never hide
//! each other.
//!
//! The context also drives animation: call [`PaletteContext::tick`] whenever
//! the event loop wakes up, and sleep until [`PaletteContext::next_deadline`]
//! otherwise.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use palette_engine::time::Clock;

use crate::config::PaletteConfig;
use crate::group::PaletteGroups;
use crate::observer::PaletteObserver;
use crate::palette::{Palette, WeakPalette};
use crate::toolkit::Toolkit;

struct ContextInner {
    toolkit: Rc<dyn Toolkit>,
    clock: Rc<dyn Clock>,
    observer: PaletteObserver,
    config: PaletteConfig,
    groups: PaletteGroups,
    palettes: RefCell<Vec<WeakPalette>>,
}

/// Cheaply cloneable handle; clones share everything.
#[derive(Clone)]
pub struct PaletteContext(Rc<ContextInner>);

impl PaletteContext {
    pub fn new(toolkit: Rc<dyn Toolkit>, clock: Rc<dyn Clock>, config: PaletteConfig) -> Self {
        Self(Rc::new(ContextInner {
            toolkit,
            clock,
            observer: PaletteObserver::new(),
            config,
            groups: PaletteGroups::default(),
            palettes: RefCell::new(Vec::new()),
        }))
    }

    #[inline]
    pub fn toolkit(&self) -> &Rc<dyn Toolkit> {
        &self.0.toolkit
    }

    #[inline]
    pub fn observer(&self) -> &PaletteObserver {
        &self.0.observer
    }

    #[inline]
    pub fn config(&self) -> &PaletteConfig {
        &self.0.config
    }

    #[inline]
    pub fn groups(&self) -> &PaletteGroups {
        &self.0.groups
    }

    #[inline]
    pub fn now(&self) -> Instant {
        self.0.clock.now()
    }

    pub(crate) fn register(&self, palette: WeakPalette) {
        self.0.palettes.borrow_mut().push(palette);
    }

    /// Live palettes created from this context, in creation order.
    pub fn palettes(&self) -> Vec<Palette> {
        let mut palettes = self.0.palettes.borrow_mut();
        palettes.retain(|p| p.upgrade().is_some());
        palettes.iter().filter_map(WeakPalette::upgrade).collect()
    }

    /// Delivers every animation frame that is due.
    pub fn tick(&self) {
        for palette in self.palettes() {
            palette.tick();
        }
    }

    /// Earliest instant at which any palette has a frame due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.palettes().iter().filter_map(Palette::next_deadline).min()
    }
}

impl fmt::Debug for PaletteContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaletteContext")
            .field("observer", &self.0.observer)
            .field("config", &self.0.config)
            .field("palettes", &self.0.palettes.borrow().len())
            .finish_non_exhaustive()
    }
}
