//! Weft Core
//!
//! This crate provides a fine-grained dependency tracking engine. It records
//! which computations ("effects") read which (object, key) pairs, and re-runs
//! exactly those effects when a pair is triggered.
//!
//! It implements:
//!
//! - Effects with reference identity
//! - `track` / `trigger` over a weakly keyed dependency graph
//! - Pause/resume windows that defer tracking and drop notifications
//! - Observable cells built on the same calling convention
//!
//! The engine is single-threaded and fully synchronous. It has no scheduler,
//! does no diffing and caches no derived values; it only calls back into the
//! effects it was given.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Effects, the tracker, and the per-thread ambient runtime
//! - `graph`: Target identity and the dependency graph storage
//! - `config`: Tracker configuration
//! - `error`: Configuration errors
//!
//! # Example
//!
//! ```rust
//! use std::rc::Rc;
//! use weft_core::{effect, track, trigger, Effect};
//!
//! let state = Rc::new(());
//!
//! let render = {
//!     let state = state.clone();
//!     Effect::new(move |force| {
//!         track(&state, "count");
//!         println!("render (forced: {force})");
//!     })
//! };
//!
//! // Runs once and subscribes to (state, "count")
//! effect(&render);
//!
//! // Runs again: prints "render (forced: false)"
//! trigger(&state, "count", false);
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod reactive;

pub use config::{EffectScoping, TrackerConfig};
pub use error::ConfigError;
pub use graph::{Liveness, Target, TargetId};
pub use reactive::{
    create_effect, effect, pause_tracking, resume_tracking, track, trigger, Effect, EffectId, Key,
    Observable, PauseGuard, Symbol, Tracker, WeakEffect,
};
