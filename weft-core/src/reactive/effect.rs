//! Effect Handles
//!
//! An [`Effect`] is a caller-supplied callback that the engine re-runs when
//! something it read changes. The engine identifies effects by reference:
//! clones of one handle are the same effect, while two handles built from
//! identical closures are different effects.
//!
//! # Invocation
//!
//! Every effect receives one boolean argument:
//!
//! - `false` when it runs under `effect()`.
//! - The `force` flag passed to `trigger()` when it is notified.
//!
//! The engine gives `force` no meaning of its own; a subscriber may use it to
//! tell a forced refresh apart from an ordinary change.
//!
//! # Ownership
//!
//! The [`Effect`] handle owns the callback. The dependency graph only keeps a
//! [`WeakEffect`], so an effect is unsubscribed everywhere once the last
//! handle is dropped, and a callback that captures the objects it reads does
//! not keep them alive through the graph. Dead subscribers are cleaned up
//! lazily, when their key is triggered or the graph is swept.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u64);

impl EffectId {
    /// Generate a new unique effect ID.
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect#{}", self.0)
    }
}

/// A subscriber callback with reference identity.
///
/// # Example
///
/// ```rust
/// use std::rc::{Rc, Weak};
/// use weft_core::{effect, track, trigger, Effect};
///
/// let panel = Rc::new(());
/// let log = {
///     let panel = panel.clone();
///     Effect::new(move |force| {
///         track(&panel, "title");
///         println!("title changed (forced: {force})");
///     })
/// };
///
/// effect(&log);
/// trigger(&panel, "title", false);
/// ```
#[derive(Clone)]
pub struct Effect {
    id: EffectId,
    run: Rc<dyn Fn(bool)>,
}

impl Effect {
    /// Wrap a callback as a new, distinct effect.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn(bool) + 'static,
    {
        Self {
            id: EffectId::next(),
            run: Rc::new(run),
        }
    }

    /// Get the effect's unique ID.
    pub fn id(&self) -> EffectId {
        self.id
    }

    /// Invoke the callback directly, outside of any tracking scope.
    pub fn call(&self, force: bool) {
        (self.run)(force);
    }

    /// Create a non-owning handle to this effect.
    pub fn downgrade(&self) -> WeakEffect {
        WeakEffect {
            id: self.id,
            run: Rc::downgrade(&self.run),
        }
    }
}

/// A non-owning handle to an [`Effect`], as held by the dependency graph.
///
/// Equality and hashing use the effect's ID, so a weak handle still
/// identifies its effect after the callback is gone.
#[derive(Clone)]
pub struct WeakEffect {
    id: EffectId,
    run: Weak<dyn Fn(bool)>,
}

impl WeakEffect {
    /// Get the effect's unique ID.
    pub fn id(&self) -> EffectId {
        self.id
    }

    /// Check whether some [`Effect`] handle still owns the callback.
    pub fn is_alive(&self) -> bool {
        self.run.strong_count() > 0
    }

    /// Recover a strong handle, if the effect is still alive.
    pub fn upgrade(&self) -> Option<Effect> {
        self.run.upgrade().map(|run| Effect { id: self.id, run })
    }
}

impl PartialEq for WeakEffect {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for WeakEffect {}

impl Hash for WeakEffect {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for WeakEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakEffect")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl PartialEq for Effect {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Effect {}

impl Hash for Effect {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn effect_ids_are_unique() {
        let a = Effect::new(|_| {});
        let b = Effect::new(|_| {});

        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn clones_share_identity() {
        let a = Effect::new(|_| {});
        let b = a.clone();

        assert_eq!(a.id(), b.id());
        assert_eq!(a, b);
    }

    #[test]
    fn call_passes_force_through() {
        let seen = Rc::new(Cell::new(None));
        let seen_clone = seen.clone();

        let effect = Effect::new(move |force| seen_clone.set(Some(force)));

        effect.call(true);
        assert_eq!(seen.get(), Some(true));

        effect.call(false);
        assert_eq!(seen.get(), Some(false));
    }

    #[test]
    fn weak_handle_does_not_own_callback() {
        let captured = Rc::new(());
        let effect = {
            let captured = captured.clone();
            Effect::new(move |_| {
                let _ = &captured;
            })
        };
        let weak = effect.downgrade();

        assert_eq!(weak.id(), effect.id());
        assert_eq!(weak.upgrade(), Some(effect.clone()));
        assert_eq!(Rc::strong_count(&captured), 2);

        drop(effect);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
        assert_eq!(Rc::strong_count(&captured), 1);
    }
}
