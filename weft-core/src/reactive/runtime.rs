//! Ambient Runtime
//!
//! Most callers never build a [`Tracker`] themselves. Each thread gets a
//! default tracker, created lazily on first use, and the free functions in
//! this module forward to it. This gives a single ambient active-effect slot
//! per thread, which is what lets a property getter call [`track`] without
//! being handed any context.
//!
//! The default tracker reads its configuration from the environment (see
//! [`TrackerConfig::from_env`]). An invalid setting is logged and replaced by
//! the defaults.

use tracing::warn;

use super::effect::Effect;
use super::key::Key;
use super::tracker::Tracker;
use crate::config::TrackerConfig;
use crate::graph::Target;

thread_local! {
    static RUNTIME: Tracker = Tracker::new(load_config());
}

fn load_config() -> TrackerConfig {
    TrackerConfig::from_env().unwrap_or_else(|err| {
        warn!(%err, "ignoring invalid tracker configuration from environment");
        TrackerConfig::default()
    })
}

/// Run `f` with this thread's tracker.
pub fn with_runtime<F, R>(f: F) -> R
where
    F: FnOnce(&Tracker) -> R,
{
    RUNTIME.with(f)
}

/// Run `effect` once as the active effect. See [`Tracker::effect`].
pub fn effect(effect: &Effect) {
    with_runtime(|rt| rt.effect(effect))
}

/// Wrap `run` in an [`Effect`], run it, and return the handle.
pub fn create_effect<F>(run: F) -> Effect
where
    F: Fn(bool) + 'static,
{
    with_runtime(|rt| rt.create_effect(run))
}

/// Subscribe the active effect to `(target, key)`. See [`Tracker::track`].
pub fn track<T>(target: &T, key: impl Into<Key>)
where
    T: Target + ?Sized,
{
    with_runtime(|rt| rt.track(target, key))
}

/// Notify the subscribers of `(target, key)`. See [`Tracker::trigger`].
pub fn trigger<T>(target: &T, key: impl Into<Key>, force: bool)
where
    T: Target + ?Sized,
{
    with_runtime(|rt| rt.trigger(target, key, force))
}

/// Start deferring `track` and dropping `trigger`.
pub fn pause_tracking() {
    with_runtime(Tracker::pause_tracking)
}

/// Stop pausing and replay deferred `track` calls.
pub fn resume_tracking() {
    with_runtime(Tracker::resume_tracking)
}

/// Check whether this thread's tracker is paused.
pub fn is_paused() -> bool {
    with_runtime(Tracker::is_paused)
}

/// Drop dependency entries of objects that no longer exist.
pub fn reclaim() -> usize {
    with_runtime(Tracker::reclaim)
}
