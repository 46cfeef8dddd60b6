//! Shared foundations for the arbor IR crates.
//!
//! Provides the string interner behind identifier and string-constant fields
//! and the content hash used for lookup memoization and snapshot integrity.

#![warn(missing_docs)]

pub mod hash;
pub mod ident;

pub use hash::{ContentHash, ContentHasher};
pub use ident::{Interner, Symbol};
