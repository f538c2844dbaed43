//! Target Entries
//!
//! Each observed object that has ever been tracked owns one entry: the weak
//! handle used for reclamation, plus a map from property key to the set of
//! effects subscribed to that key. Subscribers are held weakly as well.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexSet;

use super::target::Liveness;
use crate::reactive::{Effect, Key, WeakEffect};

/// Live subscribers of one key, detached from the graph.
pub type SubscriberList = smallvec::SmallVec<[Effect; 4]>;

/// The dependency bookkeeping for a single observed object.
pub struct TargetEntry {
    /// Weak handle to the observed object.
    liveness: Box<dyn Liveness>,

    /// Subscribers per property key.
    /// Sets are insertion-ordered so notification order is stable.
    keys: HashMap<Key, IndexSet<WeakEffect>>,
}

impl TargetEntry {
    /// Create an empty entry for the object behind `liveness`.
    pub fn new(liveness: Box<dyn Liveness>) -> Self {
        Self {
            liveness,
            keys: HashMap::new(),
        }
    }

    /// Check whether the observed object still exists.
    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Add `effect` as a subscriber of `key`.
    ///
    /// Returns `false` if it was already subscribed.
    pub fn subscribe(&mut self, key: Key, effect: WeakEffect) -> bool {
        self.keys.entry(key).or_default().insert(effect)
    }

    /// Upgrade the subscribers of `key`, dropping any that have died.
    pub fn live_subscribers(&mut self, key: &Key) -> SubscriberList {
        let Some(set) = self.keys.get_mut(key) else {
            return SubscriberList::new();
        };

        let mut live = SubscriberList::new();
        set.retain(|weak| match weak.upgrade() {
            Some(effect) => {
                live.push(effect);
                true
            }
            None => false,
        });

        if set.is_empty() {
            self.keys.remove(key);
        }
        live
    }

    /// Number of live subscribers of `key`.
    pub fn subscriber_count(&self, key: &Key) -> usize {
        self.keys
            .get(key)
            .map_or(0, |set| set.iter().filter(|weak| weak.is_alive()).count())
    }

    /// Drop dead subscribers and keys left without any.
    ///
    /// Returns the number of subscribers removed.
    pub fn prune(&mut self) -> usize {
        let mut removed = 0;
        self.keys.retain(|_, set| {
            let before = set.len();
            set.retain(WeakEffect::is_alive);
            removed += before - set.len();
            !set.is_empty()
        });
        removed
    }

    /// Number of keys with a subscriber set.
    #[cfg(test)]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

impl fmt::Debug for TargetEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetEntry")
            .field("alive", &self.is_alive())
            .field("keys", &self.keys)
            .finish()
    }
}
