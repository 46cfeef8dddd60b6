//! Sparse, id-indexed slot storage for IR nodes.
//!
//! Unlike an append-only arena, ids here are chosen by the caller (front-end
//! numbering, merge remapping), may be reserved before their value exists,
//! and may be installed out of order. A known id is either reserved or
//! occupied; unknown ids take no space.

use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Trait for opaque ID types used as arena keys.
pub trait ArenaId: Copy {
    /// Creates an ID from a raw `u32` index.
    fn from_raw(index: u32) -> Self;

    /// Returns the raw `u32` index.
    fn as_raw(self) -> u32;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Slot<T> {
    Reserved,
    Occupied(T),
}

/// Slot storage keyed by caller-chosen ids.
///
/// Only known ids take space, so a reference to a far-away id costs one
/// entry rather than every id below it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena<I: ArenaId, T> {
    slots: BTreeMap<u32, Slot<T>>,
    occupied: usize,
    #[serde(skip)]
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
            occupied: 0,
            _marker: PhantomData,
        }
    }

    /// Marks `id` as known without giving it a value.
    ///
    /// Returns `true` if the id was unknown. Reserving an occupied or
    /// already-reserved id is a no-op.
    pub fn reserve(&mut self, id: I) -> bool {
        match self.slots.entry(id.as_raw()) {
            Entry::Vacant(slot) => {
                slot.insert(Slot::Reserved);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Stores `item` at `id`, returning the value it replaced.
    pub fn insert(&mut self, id: I, item: T) -> Option<T> {
        match self.slots.insert(id.as_raw(), Slot::Occupied(item)) {
            Some(Slot::Occupied(old)) => Some(old),
            _ => {
                self.occupied += 1;
                None
            }
        }
    }

    /// Returns the item at `id`, if occupied.
    pub fn get(&self, id: I) -> Option<&T> {
        match self.slots.get(&id.as_raw()) {
            Some(Slot::Occupied(item)) => Some(item),
            _ => None,
        }
    }

    /// Returns `true` if `id` holds a value.
    pub fn contains(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    /// Returns `true` if `id` is reserved or occupied.
    pub fn is_known(&self, id: I) -> bool {
        self.slots.contains_key(&id.as_raw())
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.occupied
    }

    /// Returns `true` if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.occupied == 0
    }

    /// Iterates over occupied `(ID, &T)` pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots.iter().filter_map(|(&raw, slot)| match slot {
            Slot::Occupied(item) => Some((I::from_raw(raw), item)),
            Slot::Reserved => None,
        })
    }

    /// Iterates over ids that are reserved but not yet occupied.
    pub fn pending(&self) -> impl Iterator<Item = I> + '_ {
        self.slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Reserved))
            .map(|(&raw, _)| I::from_raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NodeId;

    fn id(raw: u32) -> NodeId {
        NodeId::from_raw(raw)
    }

    #[test]
    fn insert_out_of_order() {
        let mut arena: Arena<NodeId, &str> = Arena::new();
        arena.insert(id(5), "five");
        arena.insert(id(2), "two");
        assert_eq!(arena.get(id(5)), Some(&"five"));
        assert_eq!(arena.get(id(2)), Some(&"two"));
        assert_eq!(arena.get(id(3)), None);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn reserve_then_insert() {
        let mut arena: Arena<NodeId, u32> = Arena::new();
        assert!(arena.reserve(id(4)));
        assert!(!arena.reserve(id(4)));
        assert!(arena.is_known(id(4)));
        assert!(!arena.contains(id(4)));
        assert_eq!(arena.pending().collect::<Vec<_>>(), vec![id(4)]);

        arena.insert(id(4), 40);
        assert!(arena.contains(id(4)));
        assert!(!arena.reserve(id(4)));
        assert_eq!(arena.pending().count(), 0);
    }

    #[test]
    fn replace_returns_previous() {
        let mut arena: Arena<NodeId, u32> = Arena::new();
        assert_eq!(arena.insert(id(1), 10), None);
        assert_eq!(arena.insert(id(1), 11), Some(10));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(id(1)), Some(&11));
    }

    #[test]
    fn iter_skips_holes_in_id_order() {
        let mut arena: Arena<NodeId, char> = Arena::new();
        arena.insert(id(9), 'c');
        arena.insert(id(1), 'a');
        arena.reserve(id(3));
        arena.insert(id(4), 'b');
        let collected: Vec<_> = arena.iter().map(|(i, c)| (i.as_raw(), *c)).collect();
        assert_eq!(collected, vec![(1, 'a'), (4, 'b'), (9, 'c')]);
    }

    #[test]
    fn default_is_empty() {
        let arena: Arena<NodeId, u32> = Arena::default();
        assert!(arena.is_empty());
        assert!(!arena.is_known(id(1)));
    }

    #[test]
    fn serde_roundtrip() {
        let mut arena: Arena<NodeId, String> = Arena::new();
        arena.insert(id(2), "second".to_string());
        arena.reserve(id(3));
        let json = serde_json::to_string(&arena).unwrap();
        let restored: Arena<NodeId, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.get(id(2)).map(String::as_str), Some("second"));
        assert!(restored.is_known(id(3)));
    }

    #[test]
    fn distant_ids_stay_sparse() {
        let mut arena: Arena<NodeId, u8> = Arena::new();
        assert!(arena.reserve(id(u32::MAX)));
        arena.insert(id(3_000_000_000), 7);
        assert_eq!(arena.slots.len(), 2);
        assert_eq!(arena.get(id(3_000_000_000)), Some(&7));
        assert_eq!(arena.pending().collect::<Vec<_>>(), vec![id(u32::MAX)]);
    }
}
