//! Tracker
//!
//! The tracker is the engine itself: it owns the dependency graph, the
//! active-effect slot, the pause flag and the deferred-track queue, and
//! exposes the four operations that act on them.
//!
//! # How It Works
//!
//! 1. `effect(e)` runs `e` with the active-effect slot set to `e`.
//!
//! 2. `track(target, key)` subscribes the active effect, if any, to
//!    `(target, key)`. While paused, the subscription is queued together with
//!    the effect that was active when `track` was called.
//!
//! 3. `trigger(target, key, force)` calls every subscriber of `(target, key)`
//!    once with `force`. While paused, it does nothing at all.
//!
//! 4. `resume_tracking()` clears the pause flag and applies the queued
//!    subscriptions in the order they were made.
//!
//! # Reentrancy
//!
//! Effects are free to call back into the tracker: they may track, trigger,
//! pause, or run nested effects. No internal borrow is held while caller code
//! runs; `trigger` works from a snapshot of the subscriber set taken before
//! the first subscriber is called.
//!
//! # Ownership
//!
//! The tracker never owns effects or observed objects. Callers keep the
//! [`Effect`] handles they want subscribed; once the last handle is dropped
//! the effect stops being notified, and whatever its callback captured,
//! including the objects it reads and the tracker itself, is released.
//!
//! # Thread Safety
//!
//! None. A tracker is `!Send` and `!Sync`; each thread that needs one gets
//! its own (see [`runtime`](super::runtime)).

use std::cell::{Cell, RefCell};
use std::fmt;

use tracing::{debug, trace, trace_span};

use super::context::{ActiveEffect, EffectScope};
use super::effect::{Effect, EffectId, WeakEffect};
use super::key::Key;
use crate::config::TrackerConfig;
use crate::graph::{DependencyGraph, Liveness, Target, TargetId};

/// A `track` call recorded while tracking was paused.
struct DeferredTrack {
    target: TargetId,
    watch: Box<dyn Liveness>,
    key: Key,
    effect: WeakEffect,
}

/// A dependency tracking engine.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use weft_core::{Effect, Tracker, TrackerConfig};
///
/// let tracker = Rc::new(Tracker::new(TrackerConfig::default()));
/// let target = Rc::new(());
/// let runs = Rc::new(Cell::new(0));
///
/// let watcher = {
///     let tracker = tracker.clone();
///     let target = target.clone();
///     let runs = runs.clone();
///     Effect::new(move |_| {
///         tracker.track(&target, "value");
///         runs.set(runs.get() + 1);
///     })
/// };
///
/// tracker.effect(&watcher);
/// tracker.trigger(&target, "value", false);
/// assert_eq!(runs.get(), 2);
/// ```
pub struct Tracker {
    config: TrackerConfig,
    graph: RefCell<DependencyGraph>,
    active: ActiveEffect,
    paused: Cell<bool>,
    deferred: RefCell<Vec<DeferredTrack>>,
}

impl Tracker {
    /// Create a tracker with an empty dependency graph.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            graph: RefCell::new(DependencyGraph::new(config.sweep_interval)),
            active: ActiveEffect::default(),
            paused: Cell::new(false),
            deferred: RefCell::new(Vec::new()),
            config,
        }
    }

    /// Get the tracker's configuration.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Run `effect` once with it as the active effect.
    ///
    /// Every `track` reached from the effect subscribes it. When the call
    /// returns (or unwinds) the active slot is cleared, or restored to the
    /// enclosing effect under [`EffectScoping::Restore`].
    ///
    /// [`EffectScoping::Restore`]: crate::config::EffectScoping::Restore
    pub fn effect(&self, effect: &Effect) {
        let span = trace_span!("effect", id = %effect.id());
        let _enter = span.enter();

        let _scope = EffectScope::enter(&self.active, effect, self.config.effect_scoping);
        effect.call(false);
    }

    /// Wrap `run` in a new [`Effect`], run it, and return the handle.
    pub fn create_effect<F>(&self, run: F) -> Effect
    where
        F: Fn(bool) + 'static,
    {
        let effect = Effect::new(run);
        self.effect(&effect);
        effect
    }

    /// Declare that the active effect depends on `(target, key)`.
    ///
    /// Does nothing if no effect is active. While paused, the declaration is
    /// queued and applied by [`resume_tracking`](Self::resume_tracking).
    pub fn track<T>(&self, target: &T, key: impl Into<Key>)
    where
        T: Target + ?Sized,
    {
        let Some(effect) = self.active.current() else {
            return;
        };

        let key = key.into();
        let id = target.target_id();

        if self.paused.get() {
            trace!(object = %id, %key, effect = %effect.id(), "deferring track while paused");
            self.deferred.borrow_mut().push(DeferredTrack {
                target: id,
                watch: target.watch(),
                key,
                effect: effect.downgrade(),
            });
            return;
        }

        self.subscribe(id, || target.watch(), key, effect.downgrade());
    }

    /// Call every subscriber of `(target, key)` with `force`.
    ///
    /// Does nothing while paused; the notification is dropped, not queued.
    pub fn trigger<T>(&self, target: &T, key: impl Into<Key>, force: bool)
    where
        T: Target + ?Sized,
    {
        let key = key.into();
        let id = target.target_id();

        if self.paused.get() {
            trace!(object = %id, %key, "dropping trigger while paused");
            return;
        }

        let subscribers = self.graph.borrow_mut().subscribers(id, &key);
        if subscribers.is_empty() {
            return;
        }

        trace!(object = %id, %key, force, count = subscribers.len(), "notifying subscribers");
        for effect in subscribers {
            effect.call(force);
        }
    }

    /// Queue `track` calls and drop `trigger` calls until resumed.
    ///
    /// The pause state is a single flag: pausing twice needs only one resume.
    pub fn pause_tracking(&self) {
        if !self.paused.replace(true) {
            debug!("tracking paused");
        }
    }

    /// Clear the pause flag and apply queued `track` calls in order.
    ///
    /// Each queued call subscribes the effect that was active when it was
    /// made. The active-effect slot itself is left untouched. Calls whose
    /// target or effect has been dropped in the meantime are skipped. The
    /// queue is empty when this returns.
    pub fn resume_tracking(&self) {
        if self.paused.replace(false) {
            debug!("tracking resumed");
        }

        let queued = std::mem::take(&mut *self.deferred.borrow_mut());
        if queued.is_empty() {
            return;
        }

        debug!(count = queued.len(), "replaying deferred tracks");
        for record in queued {
            if !record.watch.is_alive() {
                trace!(object = %record.target, key = %record.key, "skipping deferred track for dropped object");
                continue;
            }
            if !record.effect.is_alive() {
                trace!(object = %record.target, key = %record.key, effect = %record.effect.id(), "skipping deferred track for dropped effect");
                continue;
            }
            let watch = record.watch;
            self.subscribe(record.target, move || watch, record.key, record.effect);
        }
    }

    /// Pause tracking until the returned guard is dropped.
    ///
    /// Dropping any guard resumes tracking completely, including a pause that
    /// was already in effect when the guard was created.
    pub fn pause(&self) -> PauseGuard<'_> {
        self.pause_tracking();
        PauseGuard { tracker: self }
    }

    /// Check whether tracking is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    /// Check whether an effect is running.
    pub fn is_tracking(&self) -> bool {
        self.active.is_set()
    }

    /// Get the ID of the running effect, if any.
    pub fn active_effect(&self) -> Option<EffectId> {
        self.active.current_id()
    }

    /// Number of `track` calls waiting for [`resume_tracking`](Self::resume_tracking).
    pub fn deferred_len(&self) -> usize {
        self.deferred.borrow().len()
    }

    /// Check whether `target` has a dependency entry.
    pub fn is_observed<T>(&self, target: &T) -> bool
    where
        T: Target + ?Sized,
    {
        self.graph.borrow().contains(target.target_id())
    }

    /// Number of live effects subscribed to `(target, key)`.
    pub fn subscriber_count<T>(&self, target: &T, key: impl Into<Key>) -> usize
    where
        T: Target + ?Sized,
    {
        self.graph
            .borrow()
            .subscriber_count(target.target_id(), &key.into())
    }

    /// Number of objects with dependency entries, including dropped objects
    /// that have not been reclaimed yet.
    pub fn target_count(&self) -> usize {
        self.graph.borrow().target_count()
    }

    /// Drop the entries of every object that no longer exists, along with
    /// subscribers whose effect has been dropped.
    ///
    /// Returns the number of entries removed.
    pub fn reclaim(&self) -> usize {
        self.graph.borrow_mut().sweep()
    }

    fn subscribe<F>(&self, target: TargetId, watch: F, key: Key, effect: WeakEffect)
    where
        F: FnOnce() -> Box<dyn Liveness>,
    {
        trace!(object = %target, %key, effect = %effect.id(), "tracking");
        self.graph
            .borrow_mut()
            .subscribe_with(target, watch, key, effect);
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("config", &self.config)
            .field("paused", &self.paused.get())
            .field("active_effect", &self.active.current_id())
            .field("deferred", &self.deferred_len())
            .field("targets", &self.target_count())
            .finish()
    }
}

/// Guard returned by [`Tracker::pause`]; resumes tracking when dropped.
#[must_use = "tracking resumes as soon as the guard is dropped"]
pub struct PauseGuard<'a> {
    tracker: &'a Tracker,
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        self.tracker.resume_tracking();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectScoping;
    use std::rc::Rc;

    /// An effect that tracks `(target, key)` and counts its runs.
    fn counter(tracker: &Rc<Tracker>, target: &Rc<()>, key: &'static str) -> (Effect, Rc<Cell<u32>>) {
        let runs = Rc::new(Cell::new(0));
        let effect = {
            let tracker = tracker.clone();
            let target = target.clone();
            let runs = runs.clone();
            Effect::new(move |_| {
                tracker.track(&target, key);
                runs.set(runs.get() + 1);
            })
        };
        (effect, runs)
    }

    /// An effect that tracks `(target, key)` and logs `name` when notified.
    fn logger(
        tracker: &Rc<Tracker>,
        target: &Rc<()>,
        key: &'static str,
        name: &'static str,
        log: &Rc<RefCell<Vec<&'static str>>>,
    ) -> Effect {
        let tracker = tracker.clone();
        let target = target.clone();
        let log = log.clone();
        Effect::new(move |force| {
            tracker.track(&target, key);
            if force {
                log.borrow_mut().push(name);
            }
        })
    }

    #[test]
    fn track_without_effect_is_ignored() {
        let tracker = Tracker::default();
        let target = Rc::new(());

        tracker.track(&target, "k");

        assert_eq!(tracker.subscriber_count(&target, "k"), 0);
        assert_eq!(tracker.target_count(), 0);
        assert!(!tracker.is_observed(&target));
    }

    #[test]
    fn effect_subscribes_and_trigger_notifies() {
        let tracker = Rc::new(Tracker::default());
        let target = Rc::new(());
        let (effect, runs) = counter(&tracker, &target, "k");

        tracker.effect(&effect);
        assert_eq!(runs.get(), 1);
        assert_eq!(tracker.subscriber_count(&target, "k"), 1);
        assert!(tracker.is_observed(&target));
        assert!(!tracker.is_tracking());

        tracker.trigger(&target, "k", false);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn trigger_passes_force() {
        let tracker = Rc::new(Tracker::default());
        let target = Rc::new(());
        let seen = Rc::new(RefCell::new(Vec::new()));

        let _effect = {
            let tracker_clone = tracker.clone();
            let target = target.clone();
            let seen = seen.clone();
            tracker.create_effect(move |force| {
                tracker_clone.track(&target, "k");
                seen.borrow_mut().push(force);
            })
        };

        tracker.trigger(&target, "k", false);
        tracker.trigger(&target, "k", true);

        assert_eq!(*seen.borrow(), vec![false, false, true]);
    }

    #[test]
    fn paused_tracks_are_counted_and_drained() {
        let tracker = Rc::new(Tracker::default());
        let target = Rc::new(());
        let (first, _) = counter(&tracker, &target, "a");
        let (second, _) = counter(&tracker, &target, "b");

        tracker.pause_tracking();
        tracker.effect(&first);
        tracker.effect(&second);
        tracker.effect(&first);

        assert_eq!(tracker.deferred_len(), 3);
        assert_eq!(tracker.target_count(), 0);

        tracker.resume_tracking();

        assert!(!tracker.is_paused());
        assert_eq!(tracker.deferred_len(), 0);
        assert_eq!(tracker.subscriber_count(&target, "a"), 1);
        assert_eq!(tracker.subscriber_count(&target, "b"), 1);
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn paused_tracks_are_replayed_in_call_order() {
        let tracker = Rc::new(Tracker::default());
        let target = Rc::new(());
        let log = Rc::new(RefCell::new(Vec::new()));
        let first = logger(&tracker, &target, "k", "first", &log);
        let second = logger(&tracker, &target, "k", "second", &log);

        tracker.pause_tracking();
        tracker.effect(&second);
        tracker.effect(&first);
        tracker.resume_tracking();

        tracker.trigger(&target, "k", true);
        assert_eq!(*log.borrow(), vec!["second", "first"]);

        log.borrow_mut().clear();
        tracker.pause_tracking();
        let third = logger(&tracker, &target, "k", "third", &log);
        tracker.effect(&third);
        tracker.effect(&first);
        tracker.resume_tracking();

        tracker.trigger(&target, "k", true);
        assert_eq!(*log.borrow(), vec!["second", "first", "third"]);
    }

    #[test]
    fn paused_trigger_is_dropped() {
        let tracker = Rc::new(Tracker::default());
        let target = Rc::new(());
        let (effect, runs) = counter(&tracker, &target, "k");
        tracker.effect(&effect);

        tracker.pause_tracking();
        tracker.trigger(&target, "k", false);
        tracker.resume_tracking();

        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn resume_while_running_keeps_active_effect() {
        let tracker = Rc::new(Tracker::default());
        let target = Rc::new(());
        let observed = Rc::new(Cell::new(None));

        let _effect = {
            let tracker_clone = tracker.clone();
            let target = target.clone();
            let observed = observed.clone();
            tracker.create_effect(move |_| {
                tracker_clone.pause_tracking();
                tracker_clone.track(&target, "a");
                tracker_clone.resume_tracking();
                observed.set(tracker_clone.active_effect());
                tracker_clone.track(&target, "b");
            })
        };

        assert!(observed.get().is_some());
        assert_eq!(tracker.subscriber_count(&target, "a"), 1);
        assert_eq!(tracker.subscriber_count(&target, "b"), 1);
    }

    #[test]
    fn replay_skips_dropped_targets() {
        let tracker = Rc::new(Tracker::default());
        let target = Rc::new(());
        let (effect, _) = counter(&tracker, &target, "k");

        tracker.pause_tracking();
        tracker.effect(&effect);
        // The queued record holds neither the effect nor the target.
        drop(effect);
        drop(target);

        tracker.resume_tracking();
        assert_eq!(tracker.deferred_len(), 0);
        assert_eq!(tracker.target_count(), 0);
    }

    #[test]
    fn replay_skips_dropped_effects() {
        let tracker = Rc::new(Tracker::default());
        let target = Rc::new(());
        let (dropped, _) = counter(&tracker, &target, "k");
        let (kept, _) = counter(&tracker, &target, "k");

        tracker.pause_tracking();
        tracker.effect(&dropped);
        tracker.effect(&kept);
        drop(dropped);
        tracker.resume_tracking();

        assert_eq!(tracker.subscriber_count(&target, "k"), 1);
    }

    #[test]
    fn pause_guard_resumes_on_drop() {
        let tracker = Rc::new(Tracker::default());
        let target = Rc::new(());
        let (effect, _) = counter(&tracker, &target, "k");

        {
            let _paused = tracker.pause();
            assert!(tracker.is_paused());
            tracker.effect(&effect);
            assert_eq!(tracker.subscriber_count(&target, "k"), 0);
        }

        assert!(!tracker.is_paused());
        assert_eq!(tracker.subscriber_count(&target, "k"), 1);
    }

    #[test]
    fn restore_scoping_keeps_outer_subscription() {
        let config = TrackerConfig::default().with_effect_scoping(EffectScoping::Restore);
        let tracker = Rc::new(Tracker::new(config));
        let target = Rc::new(());
        let (inner, _) = counter(&tracker, &target, "inner");

        let _outer = {
            let tracker_clone = tracker.clone();
            let target = target.clone();
            tracker.create_effect(move |_| {
                tracker_clone.effect(&inner);
                tracker_clone.track(&target, "after");
            })
        };

        assert_eq!(tracker.subscriber_count(&target, "after"), 1);
        assert_eq!(tracker.subscriber_count(&target, "inner"), 1);
        assert!(!tracker.is_tracking());
    }

    #[test]
    fn dropped_effect_is_no_longer_notified() {
        let tracker = Rc::new(Tracker::default());
        let target = Rc::new(());
        let (effect, runs) = counter(&tracker, &target, "k");

        tracker.effect(&effect);
        let runs_before = runs.get();
        drop(effect);

        assert_eq!(tracker.subscriber_count(&target, "k"), 0);
        tracker.trigger(&target, "k", false);
        assert_eq!(runs.get(), runs_before);
    }

    #[test]
    fn target_captured_by_its_effect_is_reclaimed() {
        let tracker = Rc::new(Tracker::default());
        let target = Rc::new(());
        let (effect, _) = counter(&tracker, &target, "k");

        tracker.effect(&effect);
        assert_eq!(Rc::strong_count(&target), 2);
        assert_eq!(tracker.target_count(), 1);

        let watch = target.watch();
        drop(target);
        assert!(watch.is_alive());

        drop(effect);
        assert!(!watch.is_alive());
        assert_eq!(tracker.reclaim(), 1);
        assert_eq!(tracker.target_count(), 0);
    }

    #[test]
    fn effect_capturing_the_tracker_does_not_keep_it_alive() {
        let tracker = Rc::new(Tracker::default());
        let target = Rc::new(());
        let (effect, _) = counter(&tracker, &target, "k");

        tracker.effect(&effect);
        assert_eq!(Rc::strong_count(&tracker), 2);

        drop(effect);
        assert_eq!(Rc::strong_count(&tracker), 1);
    }
}
