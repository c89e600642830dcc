//! Named sets of palettes.
//!
//! Groups let an owner ask questions about several palettes at once ("is any
//! palette of this toolbar up?"). They do not change how palettes show or
//! hide.

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::observer::PaletteId;
use crate::palette::{Palette, WeakPalette};

#[derive(Default)]
pub struct PaletteGroups {
    groups: RefCell<BTreeMap<String, Vec<WeakPalette>>>,
}

impl PaletteGroups {
    pub(crate) fn add(&self, group_id: &str, palette: &Palette) {
        let mut groups = self.groups.borrow_mut();
        let members = groups.entry(group_id.to_owned()).or_default();
        if !members.iter().any(|m| m.id() == palette.id()) {
            members.push(palette.downgrade());
        }
    }

    pub(crate) fn remove(&self, group_id: &str, palette: PaletteId) {
        let mut groups = self.groups.borrow_mut();
        if let Some(members) = groups.get_mut(group_id) {
            members.retain(|m| m.id() != palette);
            if members.is_empty() {
                groups.remove(group_id);
            }
        }
    }

    /// Live members of `group_id`, in the order they joined.
    pub fn members(&self, group_id: &str) -> Vec<Palette> {
        self.groups
            .borrow()
            .get(group_id)
            .map(|members| members.iter().filter_map(WeakPalette::upgrade).collect())
            .unwrap_or_default()
    }

    /// True when any member of `group_id` is up.
    pub fn is_up(&self, group_id: &str) -> bool {
        self.members(group_id).iter().any(Palette::is_up)
    }

    /// Names of groups with at least one member.
    pub fn group_ids(&self) -> Vec<String> {
        self.groups.borrow().keys().cloned().collect()
    }
}
