//! Modulation routing: which source is allowed to bend which destination.
//!
//! Destinations form a closed enumeration — this is not a patchable graph.
//! Each modulation source (envelope, LFO, noise) carries its own [`Sends`]
//! list; the engine asks `routes(target)` before letting that source touch
//! a quantity. Absent routing is the default state and never an error.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MAX_SENDS;

/// A quantity a modulation source can be routed to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModTarget {
    Osc0Frequency,
    Osc0Phase,
    Osc0Volume,
    Osc1Frequency,
    Osc1Phase,
    Osc1Volume,
    PitchTuning,
    Volume,
}

/// Fixed-capacity destination list for one modulation source.
///
/// Slot order is irrelevant: `routes` is a pure existence test. Unused
/// slots hold `None`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sends {
    slots: [Option<ModTarget>; MAX_SENDS],
}

impl Sends {
    /// No destinations routed.
    pub const fn none() -> Self {
        Self {
            slots: [None; MAX_SENDS],
        }
    }

    /// Build a sends list from a slice of targets (extra entries beyond
    /// capacity are dropped).
    pub fn of(targets: &[ModTarget]) -> Self {
        let mut sends = Self::none();
        for &target in targets {
            sends.add(target);
        }
        sends
    }

    /// Route `target`. Returns false if the list is full; re-adding an
    /// already routed target is a no-op success.
    pub fn add(&mut self, target: ModTarget) -> bool {
        if self.routes(target) {
            return true;
        }

        for slot in self.slots.iter_mut() {
            if slot.is_none() {
                *slot = Some(target);
                return true;
            }
        }

        false
    }

    pub fn remove(&mut self, target: ModTarget) {
        for slot in self.slots.iter_mut() {
            if *slot == Some(target) {
                *slot = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.slots = [None; MAX_SENDS];
    }

    /// True iff `target` appears in any slot.
    #[inline]
    pub fn routes(&self, target: ModTarget) -> bool {
        self.slots.iter().any(|slot| *slot == Some(target))
    }

    /// A source "has routing" iff at least one slot is occupied.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.slots.iter().any(|slot| slot.is_some())
    }
}
