//! Dependency Graph Storage
//!
//! The graph maps each observed object to its [`TargetEntry`]. Entries are
//! created on the first subscription for an object and are only removed by
//! reclamation, once the object itself has been dropped.
//!
//! # Reclamation
//!
//! Both ends of a subscription are held weakly: the object through its
//! [`Liveness`] handle, the effect through a [`WeakEffect`]. Nothing in the
//! graph keeps either alive, so dropped objects and dropped effects leave
//! dead records behind. They are cleaned up:
//!
//! 1. For one key, whenever that key is read for notification.
//! 2. For the whole graph, through [`DependencyGraph::sweep`].
//! 3. Automatically, each time `sweep_interval` new entries have been created
//!    since the previous sweep.
//!
//! This keeps the table bounded by the number of live targets plus one
//! interval's worth of garbage, without scanning on every subscription.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::debug;

use super::entry::{SubscriberList, TargetEntry};
use super::target::{Liveness, TargetId};
use crate::reactive::{Key, WeakEffect};

/// The persistent mapping from (object, key) to subscribed effects.
#[derive(Debug)]
pub struct DependencyGraph {
    /// Entries indexed by target identity.
    targets: HashMap<TargetId, TargetEntry>,

    /// Entries to create between automatic sweeps.
    sweep_interval: usize,

    /// Entries created since the last sweep.
    created_since_sweep: usize,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new(sweep_interval: usize) -> Self {
        Self {
            targets: HashMap::new(),
            sweep_interval: sweep_interval.max(1),
            created_since_sweep: 0,
        }
    }

    /// Subscribe `effect` to `(target, key)`.
    ///
    /// `watch` is only called when the target has no entry yet. Returns
    /// `true` if the effect was not already subscribed.
    pub fn subscribe_with<F>(&mut self, target: TargetId, watch: F, key: Key, effect: WeakEffect) -> bool
    where
        F: FnOnce() -> Box<dyn Liveness>,
    {
        let entry = match self.targets.entry(target) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                self.created_since_sweep += 1;
                vacant.insert(TargetEntry::new(watch()))
            }
        };

        let inserted = entry.subscribe(key, effect);

        if self.created_since_sweep >= self.sweep_interval {
            self.sweep();
        }

        inserted
    }

    /// Get strong handles to the live subscribers of `(target, key)`.
    ///
    /// Dead subscribers of that key are dropped on the way. The snapshot is
    /// detached from the graph so callers can run effects that subscribe or
    /// trigger without holding a borrow.
    pub fn subscribers(&mut self, target: TargetId, key: &Key) -> SubscriberList {
        self.targets
            .get_mut(&target)
            .map(|entry| entry.live_subscribers(key))
            .unwrap_or_default()
    }

    /// Number of live effects subscribed to `(target, key)`.
    pub fn subscriber_count(&self, target: TargetId, key: &Key) -> usize {
        self.targets
            .get(&target)
            .map_or(0, |entry| entry.subscriber_count(key))
    }

    /// Check whether `target` has an entry.
    pub fn contains(&self, target: TargetId) -> bool {
        self.targets.contains_key(&target)
    }

    /// Number of target entries, dead or alive.
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Drop every entry whose target no longer exists, and every dead
    /// subscriber of the entries that remain.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self) -> usize {
        let before = self.targets.len();
        let mut pruned = 0;
        self.targets.retain(|_, entry| {
            if !entry.is_alive() {
                return false;
            }
            pruned += entry.prune();
            true
        });
        self.created_since_sweep = 0;

        let removed = before - self.targets.len();
        if removed > 0 || pruned > 0 {
            debug!(
                removed,
                pruned,
                remaining = self.targets.len(),
                "reclaimed entries of dropped targets"
            );
        }
        removed
    }
}
