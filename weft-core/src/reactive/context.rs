//! Active Effect Context
//!
//! The tracker keeps a single slot holding the effect that is currently
//! running under `effect()`. Reads made while the slot is filled subscribe
//! that effect.
//!
//! # Implementation
//!
//! Entering a scope stores the effect and returns an [`EffectScope`] guard.
//! Dropping the guard, including during a panic unwind, leaves the slot
//! according to the configured [`EffectScoping`]:
//!
//! - `Clear` empties the slot, so an outer effect stops tracking after a
//!   nested `effect()` returns.
//! - `Restore` puts back whichever effect was active on entry.

use std::cell::RefCell;

use super::effect::{Effect, EffectId};
use crate::config::EffectScoping;

/// The slot holding the currently running effect.
#[derive(Debug, Default)]
pub(crate) struct ActiveEffect {
    slot: RefCell<Option<Effect>>,
}

impl ActiveEffect {
    /// Get the current effect, if any.
    pub(crate) fn current(&self) -> Option<Effect> {
        self.slot.borrow().clone()
    }

    /// Get the ID of the current effect, if any.
    pub(crate) fn current_id(&self) -> Option<EffectId> {
        self.slot.borrow().as_ref().map(Effect::id)
    }

    /// Check whether an effect is running.
    pub(crate) fn is_set(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// Put `effect` in the slot and return what was there.
    fn replace(&self, effect: Option<Effect>) -> Option<Effect> {
        self.slot.replace(effect)
    }
}

/// Guard that leaves the active-effect slot when dropped.
pub(crate) struct EffectScope<'a> {
    slot: &'a ActiveEffect,
    previous: Option<Effect>,
    scoping: EffectScoping,
}

impl<'a> EffectScope<'a> {
    /// Make `effect` the active effect until the guard is dropped.
    pub(crate) fn enter(slot: &'a ActiveEffect, effect: &Effect, scoping: EffectScoping) -> Self {
        let previous = slot.replace(Some(effect.clone()));
        Self {
            slot,
            previous,
            scoping,
        }
    }
}

impl Drop for EffectScope<'_> {
    fn drop(&mut self) {
        let next = match self.scoping {
            EffectScoping::Clear => None,
            EffectScoping::Restore => self.previous.take(),
        };
        self.slot.replace(next);
    }
}
