//! Reactive Tracking
//!
//! This module implements the tracking engine: effects, the operations that
//! record and notify dependencies, and the ambient per-thread runtime.
//!
//! # Concepts
//!
//! ## Effects
//!
//! An [`Effect`] is a callback run under [`effect`]. While it runs it is the
//! *active effect*, and every [`track`] call it reaches subscribes it.
//!
//! ## Track and Trigger
//!
//! Reading an observable property calls `track(object, key)`. Writing it
//! calls `trigger(object, key, force)`, which calls every subscriber of that
//! pair once. Objects are identified by their shared allocation and held
//! weakly (see [`graph`](crate::graph)).
//!
//! ## Pausing
//!
//! Between [`pause_tracking`] and [`resume_tracking`], `track` calls are
//! queued and replayed on resume, while `trigger` calls are dropped.
//!
//! # Implementation Notes
//!
//! The active effect is a single slot, not a stack. By default it is emptied
//! when `effect()` returns, so an outer effect does not track anything it
//! reads after running a nested effect. [`EffectScoping::Restore`] switches
//! to restoring the enclosing effect instead.
//!
//! Subscriptions are never pruned individually. An effect stays subscribed to
//! everything it ever read until the observed object is dropped.
//!
//! [`EffectScoping::Restore`]: crate::config::EffectScoping::Restore

mod context;
mod effect;
mod key;
mod observable;
mod runtime;
mod tracker;

pub use effect::{Effect, EffectId, WeakEffect};
pub use key::{Key, Symbol};
pub use observable::Observable;
pub use runtime::{
    create_effect, effect, is_paused, pause_tracking, reclaim, resume_tracking, track, trigger,
    with_runtime,
};
pub use tracker::{PauseGuard, Tracker};
