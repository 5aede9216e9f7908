// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pooled primitive slots keyed by owning entity.

use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::primitive::{Collection, Primitive};

/// Slot allocator for one primitive kind.
///
/// Each owner holds at most one slot. Released slots are hidden, reset, and pushed onto a
/// free-list which is drained before the collection grows. The collection is created on the
/// first [`acquire`](Self::acquire) and never shrinks.
///
/// ```
/// use understory_cluster::{Marker, Pool};
///
/// let mut pool: Pool<Marker<u32>> = Pool::new();
/// let a = pool.acquire(1);
/// let b = pool.acquire(2);
/// assert_eq!(pool.acquire(1), a);
///
/// pool.release(1);
/// // The freed slot is handed out again before the collection grows.
/// assert_eq!(pool.acquire(3), a);
/// assert_eq!(pool.len(), 2);
/// # let _ = b;
/// ```
pub struct Pool<P: Primitive> {
    collection: Option<Collection<P>>,
    slots: HashMap<P::Owner, usize>,
    free_list: Vec<usize>,
}

impl<P> Debug for Pool<P>
where
    P: Primitive,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pool")
            .field("len", &self.len())
            .field("owners", &self.slots.len())
            .field("free_list", &self.free_list.len())
            .finish_non_exhaustive()
    }
}

impl<P: Primitive> Default for Pool<P> {
    fn default() -> Self {
        Self {
            collection: None,
            slots: HashMap::new(),
            free_list: Vec::new(),
        }
    }
}

impl<P> Pool<P>
where
    P: Primitive,
    P::Owner: Eq + Hash,
{
    /// Create an empty pool without a collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the slot held by `owner`, allocating one if needed.
    ///
    /// A newly handed out slot holds a default, shown primitive owned by `owner`.
    pub fn acquire(&mut self, owner: P::Owner) -> usize {
        if let Some(&slot) = self.slots.get(&owner) {
            return slot;
        }

        let collection = self.collection.get_or_insert_with(Collection::new);
        let mut primitive = P::default();
        primitive.set_owner(Some(owner));

        let slot = match self.free_list.pop() {
            Some(slot) => {
                if let Some(reused) = collection.get_mut(slot) {
                    *reused = primitive;
                }
                slot
            }
            None => collection.add(primitive),
        };
        self.slots.insert(owner, slot);
        slot
    }

    /// Like [`acquire`](Self::acquire), returning the primitive itself for styling.
    pub fn acquire_mut(&mut self, owner: P::Owner) -> &mut P {
        let slot = self.acquire(owner);
        &mut self.collection.get_or_insert_with(Collection::new)[slot]
    }

    /// Hide and reset the primitive held by `owner` and recycle its slot.
    ///
    /// Returns the released slot, or `None` if `owner` held nothing.
    pub fn release(&mut self, owner: P::Owner) -> Option<usize> {
        let slot = self.slots.remove(&owner)?;
        if let Some(primitive) = self.collection.as_mut().and_then(|c| c.get_mut(slot)) {
            primitive.reset();
        }
        self.free_list.push(slot);
        Some(slot)
    }

    /// Slot held by `owner`.
    pub fn slot_of(&self, owner: P::Owner) -> Option<usize> {
        self.slots.get(&owner).copied()
    }

    /// Whether `owner` holds a slot.
    pub fn contains(&self, owner: P::Owner) -> bool {
        self.slots.contains_key(&owner)
    }

    /// Primitive held by `owner`.
    pub fn get(&self, owner: P::Owner) -> Option<&P> {
        let slot = self.slot_of(owner)?;
        self.collection.as_ref()?.get(slot)
    }

    /// Mutable primitive held by `owner`.
    pub fn get_mut(&mut self, owner: P::Owner) -> Option<&mut P> {
        let slot = self.slot_of(owner)?;
        self.collection.as_mut()?.get_mut(slot)
    }
}

impl<P: Primitive> Pool<P> {
    /// The backing collection, if any slot was ever acquired.
    pub fn collection(&self) -> Option<&Collection<P>> {
        self.collection.as_ref()
    }

    /// Mutable backing collection.
    pub fn collection_mut(&mut self) -> Option<&mut Collection<P>> {
        self.collection.as_mut()
    }

    /// Number of slots, live or free.
    pub fn len(&self) -> usize {
        self.collection.as_ref().map_or(0, Collection::len)
    }

    /// Whether no slot was ever allocated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots waiting for reuse.
    pub fn free_len(&self) -> usize {
        self.free_list.len()
    }

    /// Drop the collection and forget every owner.
    pub fn clear(&mut self) {
        self.collection = None;
        self.slots.clear();
        self.free_list.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{Label, PointPrimitive, PrimitiveFlags};

    #[test]
    fn acquire_is_stable_per_owner() {
        let mut pool: Pool<Label<u32>> = Pool::new();
        assert!(pool.collection().is_none());
        let slot = pool.acquire(9);
        assert_eq!(pool.acquire(9), slot);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get(9).unwrap().owner, Some(9));
    }

    #[test]
    fn release_reuses_before_growing() {
        let mut pool: Pool<PointPrimitive<u32>> = Pool::new();
        let a = pool.acquire(1);
        let _b = pool.acquire(2);
        pool.get_mut(1).unwrap().pixel_size = 30.0;

        assert_eq!(pool.release(1), Some(a));
        assert_eq!(pool.free_len(), 1);
        let freed = pool.collection().unwrap().get(a).unwrap();
        assert!(!freed.flags.contains(PrimitiveFlags::SHOW));
        assert_eq!(freed.owner, None);

        let c = pool.acquire(3);
        assert_eq!(c, a);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.free_len(), 0);
        let reused = pool.get(3).unwrap();
        assert_eq!(reused.pixel_size, 10.0);
        assert!(reused.flags.contains(PrimitiveFlags::SHOW));

        pool.acquire(4);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn release_unknown_owner_is_noop() {
        let mut pool: Pool<PointPrimitive<u32>> = Pool::new();
        assert_eq!(pool.release(5), None);
        pool.acquire(1);
        assert_eq!(pool.release(5), None);
        assert_eq!(pool.release(1), Some(0));
        assert_eq!(pool.release(1), None);
        assert_eq!(pool.free_len(), 1);
    }

    #[test]
    fn length_never_decreases_across_churn() {
        let mut pool: Pool<PointPrimitive<u32>> = Pool::new();
        let mut high_water = 0;
        for round in 0..5_u32 {
            for owner in 0..10 {
                pool.acquire(round * 100 + owner);
            }
            for owner in 0..10 {
                pool.release(round * 100 + owner);
            }
            assert!(pool.len() >= high_water);
            high_water = pool.len();
        }
        assert_eq!(pool.len(), 10);
    }

    #[test]
    fn clear_drops_everything() {
        let mut pool: Pool<Label<u32>> = Pool::new();
        pool.acquire(1);
        pool.release(1);
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.free_len(), 0);
        assert!(!pool.contains(1));
    }
}
