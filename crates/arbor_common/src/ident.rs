//! Interned strings for identifier text, mangled names and string payloads.
//!
//! Every IR store owns one [`Interner`]; string-valued node fields hold a
//! [`Symbol`] into it, so equal strings compare in O(1) and a store can be
//! snapshotted together with its string table.

use lasso::Rodeo;
use serde::{Deserialize, Serialize};

/// Handle to a string interned in an [`Interner`].
///
/// A `Symbol` is only meaningful for the interner that produced it. Moving a
/// string between stores means resolving it in one and re-interning in the
/// other.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Symbol(u32);

impl Symbol {
    /// Creates a `Symbol` from a raw index. Intended for tests and decoding.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Symbol` wraps a `u32`, which always fits in `usize` on supported
// targets. `try_from_usize` rejects indices that overflow `u32`.
unsafe impl lasso::Key for Symbol {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Symbol)
    }
}

/// Single-owner string interner backed by [`lasso::Rodeo`].
///
/// Stores are mutated by one compilation pipeline at a time, so the
/// single-threaded rodeo is enough and keeps `&mut` access explicit.
#[derive(Debug, Serialize, Deserialize)]
pub struct Interner {
    rodeo: Rodeo<Symbol>,
}

impl Interner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: Rodeo::new(),
        }
    }

    /// Interns `text`, returning the existing symbol when already present.
    pub fn intern(&mut self, text: &str) -> Symbol {
        self.rodeo.get_or_intern(text)
    }

    /// Looks up `text` without interning it.
    pub fn lookup(&self, text: &str) -> Option<Symbol> {
        self.rodeo.get(text)
    }

    /// Resolves a symbol produced by this interner.
    ///
    /// Returns `None` for symbols minted by a different interner whose index
    /// is out of range here.
    pub fn resolve(&self, symbol: Symbol) -> Option<&str> {
        self.rodeo.try_resolve(&symbol)
    }

    /// Number of distinct strings interned.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns `true` if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut interner = Interner::new();
        let a = interner.intern("counter");
        let b = interner.intern("counter");
        assert_eq!(a, b);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn distinct_text_distinct_symbols() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert_ne!(a, b);
        assert_eq!(interner.resolve(a), Some("foo"));
        assert_eq!(interner.resolve(b), Some("bar"));
    }

    #[test]
    fn lookup_does_not_intern() {
        let mut interner = Interner::new();
        assert_eq!(interner.lookup("main"), None);
        assert!(interner.is_empty());
        let main = interner.intern("main");
        assert_eq!(interner.lookup("main"), Some(main));
    }

    #[test]
    fn foreign_symbol_does_not_resolve() {
        let interner = Interner::new();
        assert_eq!(interner.resolve(Symbol::from_raw(7)), None);
    }

    #[test]
    fn interner_serde_roundtrip() {
        let mut interner = Interner::new();
        let x = interner.intern("x");
        let y = interner.intern("y");
        let json = serde_json::to_string(&interner).unwrap();
        let back: Interner = serde_json::from_str(&json).unwrap();
        assert_eq!(back.lookup("x"), Some(x));
        assert_eq!(back.resolve(y), Some("y"));
    }
}
