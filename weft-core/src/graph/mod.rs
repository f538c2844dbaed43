//! Dependency Graph
//!
//! This module stores which effects depend on which (object, key) pairs.
//!
//! # Overview
//!
//! The graph is a two-level map:
//!
//! - The outer level is keyed by the identity of an observed object
//!   ([`TargetId`]) and associates it weakly: the graph never keeps an
//!   observed object alive.
//! - The inner level maps a property [`Key`](crate::reactive::Key) to the
//!   set of subscribed [`Effect`](crate::reactive::Effect)s, held weakly.
//!
//! Subscriptions are never removed one by one while both ends are alive. An
//! entry goes away as a whole once its object is dropped and the graph sweeps
//! it; a subscriber goes away once its effect is dropped.
//!
//! Only the identity types are public. The storage itself is reached through
//! [`Tracker`](crate::reactive::Tracker).

mod dependencies;
mod entry;
mod target;

pub(crate) use dependencies::DependencyGraph;
pub use target::{Liveness, Target, TargetId};
