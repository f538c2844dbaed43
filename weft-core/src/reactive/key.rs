//! Property keys.
//!
//! A key names one observable property of an object. Keys can be names,
//! numeric indices, or [`Symbol`]s, which are unique tokens that never
//! collide with a name even when their descriptions match.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A unique property key.
///
/// Two symbols are equal only if one was copied from the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    id: u64,
    description: &'static str,
}

impl Symbol {
    /// Create a new symbol, distinct from every other symbol.
    pub fn new(description: &'static str) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self {
            id: COUNTER.fetch_add(1, Ordering::Relaxed),
            description,
        }
    }

    /// The description given at creation.
    pub fn description(&self) -> &'static str {
        self.description
    }
}

/// The key half of an observed (object, key) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A property name.
    Name(Cow<'static, str>),
    /// A positional index.
    Index(usize),
    /// A unique symbol.
    Symbol(Symbol),
}

impl Key {
    /// A name key usable in `const` contexts.
    pub const fn name(name: &'static str) -> Self {
        Key::Name(Cow::Borrowed(name))
    }
}

impl From<&'static str> for Key {
    fn from(name: &'static str) -> Self {
        Key::Name(Cow::Borrowed(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(Cow::Owned(name))
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<Symbol> for Key {
    fn from(symbol: Symbol) -> Self {
        Key::Symbol(symbol)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => f.write_str(name),
            Key::Index(index) => write!(f, "[{index}]"),
            Key::Symbol(symbol) => write!(f, "Symbol({})#{}", symbol.description, symbol.id),
        }
    }
}
