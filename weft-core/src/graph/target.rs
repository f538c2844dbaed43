//! Observed Targets
//!
//! Anything that can be observed is identified by the address of its shared
//! allocation. The graph never holds a strong reference to a target: it keeps
//! a weak handle next to the identity so it can tell when the target is gone.
//!
//! Holding the weak handle keeps the allocation (not the value) reserved, so a
//! [`TargetId`] cannot be handed to a different object while the graph still
//! has an entry for it.

use std::fmt;
use std::rc::{Rc, Weak as RcWeak};
use std::sync::{Arc, Weak as ArcWeak};

/// Identity of an observed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(usize);

impl TargetId {
    /// Get the raw address value.
    pub fn raw(&self) -> usize {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// A non-owning handle that reports whether its target is still alive.
pub trait Liveness {
    /// Returns `false` once the observed value has been dropped.
    fn is_alive(&self) -> bool;
}

impl<T: ?Sized> Liveness for RcWeak<T> {
    fn is_alive(&self) -> bool {
        self.strong_count() > 0
    }
}

impl<T: ?Sized> Liveness for ArcWeak<T> {
    fn is_alive(&self) -> bool {
        self.strong_count() > 0
    }
}

/// An object whose properties can be tracked and triggered.
pub trait Target {
    /// The identity used to key the dependency graph.
    fn target_id(&self) -> TargetId;

    /// A weak handle used to detect when the target is dropped.
    fn watch(&self) -> Box<dyn Liveness>;
}

impl<T: ?Sized + 'static> Target for Rc<T> {
    fn target_id(&self) -> TargetId {
        TargetId(Rc::as_ptr(self).cast::<()>() as usize)
    }

    fn watch(&self) -> Box<dyn Liveness> {
        Box::new(Rc::downgrade(self))
    }
}

impl<T: ?Sized + 'static> Target for Arc<T> {
    fn target_id(&self) -> TargetId {
        TargetId(Arc::as_ptr(self).cast::<()>() as usize)
    }

    fn watch(&self) -> Box<dyn Liveness> {
        Box::new(Arc::downgrade(self))
    }
}
