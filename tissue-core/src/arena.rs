use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use crate::error::{Result, TissueError};
use crate::types::{EntityKind, SlotId};

/// Fixed-capacity slot storage for one kind of entity.
///
/// Slots are handed out from a high-water mark that only advances, so an
/// identity names the same entity for the whole run. Destroyed entities stay
/// in their slot as tombstones and are flagged dead in the parallel `live`
/// array; iteration skips them.
#[derive(Debug, Clone)]
pub struct Arena<I, T> {
    slots: Vec<T>,
    live: Vec<bool>,
    live_count: usize,
    capacity: usize,
    kind: EntityKind,
    _id: PhantomData<I>,
}

impl<I: SlotId, T> Arena<I, T> {
    /// Creates an empty arena able to hold `capacity` entities over the run.
    pub fn with_capacity(kind: EntityKind, capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            live: Vec::with_capacity(capacity),
            live_count: 0,
            capacity,
            kind,
            _id: PhantomData,
        }
    }

    /// Stores `value` in the next free slot and marks it live.
    ///
    /// ### Returns
    /// - `Ok(id)` naming the new slot.
    /// - `Err(TissueError::CapacityExceeded)` once every slot has been used.
    pub fn insert(&mut self, value: T) -> Result<I> {
        if self.slots.len() >= self.capacity {
            return Err(TissueError::CapacityExceeded {
                kind: self.kind,
                capacity: self.capacity,
            });
        }
        let id = I::from_index(self.slots.len());
        self.slots.push(value);
        self.live.push(true);
        self.live_count += 1;
        Ok(id)
    }

    /// Marks a slot dead. Killing an already dead slot is a no-op.
    pub fn kill(&mut self, id: I) {
        if let Some(flag) = self.live.get_mut(id.index())
            && *flag
        {
            *flag = false;
            self.live_count -= 1;
        }
    }

    #[inline]
    pub fn is_live(&self, id: I) -> bool {
        self.live.get(id.index()).copied().unwrap_or(false)
    }

    /// Returns the entity if its slot is live.
    pub fn get(&self, id: I) -> Option<&T> {
        if self.is_live(id) {
            self.slots.get(id.index())
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        if self.is_live(id) {
            self.slots.get_mut(id.index())
        } else {
            None
        }
    }

    /// Identities of all live slots, in slot order.
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        self.live
            .iter()
            .enumerate()
            .filter_map(|(i, &alive)| alive.then(|| I::from_index(i)))
    }

    /// Live entities with their identities, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> + '_ {
        self.slots
            .iter()
            .zip(&self.live)
            .enumerate()
            .filter_map(|(i, (slot, &alive))| alive.then(|| (I::from_index(i), slot)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .zip(&self.live)
            .enumerate()
            .filter_map(|(i, (slot, &alive))| alive.then(|| (I::from_index(i), slot)))
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.live_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Number of slots handed out so far, live or dead.
    #[inline]
    pub fn slots_used(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }
}

impl<I: SlotId, T> Index<I> for Arena<I, T> {
    type Output = T;

    /// ### Panics
    /// Panics if `id` was never handed out by this arena.
    #[inline]
    fn index(&self, id: I) -> &T {
        debug_assert!(self.is_live(id), "access to dead {} slot {}", self.kind, id.index());
        &self.slots[id.index()]
    }
}

impl<I: SlotId, T> IndexMut<I> for Arena<I, T> {
    #[inline]
    fn index_mut(&mut self, id: I) -> &mut T {
        debug_assert!(self.is_live(id), "access to dead {} slot {}", self.kind, id.index());
        &mut self.slots[id.index()]
    }
}
