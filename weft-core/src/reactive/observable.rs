//! Observable Cells
//!
//! An [`Observable`] is a shared value that follows the tracking calling
//! convention on its own: reads track it, writes trigger it. It is the
//! smallest useful building block on top of the ambient runtime.
//!
//! # Write Semantics
//!
//! - [`set`](Observable::set) notifies only when the new value differs from
//!   the old one, with `force = false`.
//! - [`set_forced`](Observable::set_forced) always notifies, with
//!   `force = true`, so subscribers refresh even for an equal value.
//!
//! An effect that reads an observable usually captures a clone of it. That
//! does not keep the observable alive through the dependency graph: once the
//! effect handle and the other clones are dropped, its entry is reclaimable.

use std::cell::RefCell;
use std::fmt::{self, Debug};
use std::rc::Rc;

use super::key::Key;
use super::runtime;
use crate::graph::{Liveness, Target, TargetId};

/// The key an observable's value is tracked under.
const VALUE: Key = Key::name("value");

/// A reactive cell tracked through the thread's runtime.
///
/// # Example
///
/// ```rust
/// use weft_core::{create_effect, Observable};
///
/// let title = Observable::new(String::from("Home"));
///
/// let _render = {
///     let title = title.clone();
///     create_effect(move |_| println!("title: {}", title.get()))
/// };
///
/// title.set(String::from("Settings")); // prints "title: Settings"
/// title.set(String::from("Settings")); // unchanged, prints nothing
/// ```
pub struct Observable<T> {
    inner: Rc<RefCell<T>>,
}

impl<T: 'static> Observable<T> {
    /// Create a new observable holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    /// Get a clone of the value and track it.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Read the value through `f` and track it.
    ///
    /// `f` must not write to this observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        runtime::track(&self.inner, VALUE);
        f(&*self.inner.borrow())
    }

    /// Get a clone of the value without tracking it.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.inner.borrow().clone()
    }

    /// Store `value`, notifying subscribers if it changed.
    pub fn set(&self, value: T)
    where
        T: PartialEq,
    {
        let changed = {
            let mut current = self.inner.borrow_mut();
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        };

        if changed {
            runtime::trigger(&self.inner, VALUE, false);
        }
    }

    /// Store `value` and notify subscribers with `force = true`.
    pub fn set_forced(&self, value: T) {
        *self.inner.borrow_mut() = value;
        runtime::trigger(&self.inner, VALUE, true);
    }

    /// Replace the value with `f(&current)`, notifying if it changed.
    pub fn update<F>(&self, f: F)
    where
        T: PartialEq,
        F: FnOnce(&T) -> T,
    {
        let next = f(&*self.inner.borrow());
        self.set(next);
    }

    /// Check whether two observables share the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: 'static> Target for Observable<T> {
    fn target_id(&self) -> TargetId {
        self.inner.target_id()
    }

    fn watch(&self) -> Box<dyn Liveness> {
        self.inner.watch()
    }
}

impl<T: Debug> Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.borrow())
            .finish()
    }
}
