//! The node handle type.
//!
//! Every cross-reference in the IR is a [`NodeId`]. Raw value 0 is reserved
//! as the invalid id and is never handed out by a store.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque, copyable handle of a node within one [`NodeStore`](crate::NodeStore).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// The reserved invalid id.
    pub const INVALID: NodeId = NodeId(0);

    /// Creates an id from its raw value.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw value.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns `false` for the reserved id 0.
    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl ArenaId for NodeId {
    fn from_raw(index: u32) -> Self {
        Self(index)
    }

    fn as_raw(self) -> u32 {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Error returned when text is not a valid node id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid node id `{0}`")]
pub struct ParseNodeIdError(String);

/// Parses `12` or `@12`. Zero is rejected.
impl FromStr for NodeId {
    type Err = ParseNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('@').unwrap_or(s).parse::<u32>() {
            Ok(raw) if raw != 0 => Ok(Self(raw)),
            _ => Err(ParseNodeIdError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_roundtrip() {
        let id = NodeId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
        assert!(id.is_valid());
        assert!(!NodeId::INVALID.is_valid());
        assert_eq!(NodeId::default(), NodeId::INVALID);
    }

    #[test]
    fn display_uses_at_prefix() {
        assert_eq!(NodeId::from_raw(7).to_string(), "@7");
    }

    #[test]
    fn parse_with_and_without_prefix() {
        assert_eq!("@12".parse::<NodeId>().unwrap(), NodeId::from_raw(12));
        assert_eq!("12".parse::<NodeId>().unwrap(), NodeId::from_raw(12));
        assert!("@0".parse::<NodeId>().is_err());
        assert!("@x".parse::<NodeId>().is_err());
    }

    #[test]
    fn ordering_follows_raw_value() {
        assert!(NodeId::from_raw(3) < NodeId::from_raw(10));
    }

    #[test]
    fn serde_roundtrip() {
        let id = NodeId::from_raw(99);
        let json = serde_json::to_string(&id).unwrap();
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
